use std::path::PathBuf;

use crate::cancel::CancellationToken;
use crate::config::{DesignConfig, ValidatedDesign};
use crate::grid::GridUnit;
use crate::power::PowerCurve;
use crate::sim::SimulationRun;

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub tsv_path: PathBuf,
    pub units_tsv_path: PathBuf,
}

#[derive(Debug)]
pub struct Ctx {
    pub config: DesignConfig,
    pub write_json: bool,
    pub write_tsv: bool,
    pub write_units_tsv: bool,
    pub cancel: CancellationToken,
    pub design: Option<ValidatedDesign>,
    pub grid: Vec<GridUnit>,
    pub run: Option<SimulationRun>,
    pub curve: Option<PowerCurve>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub tool_version: String,
}

impl Ctx {
    pub fn new(
        config: DesignConfig,
        out_dir: PathBuf,
        write_json: bool,
        write_tsv: bool,
        write_units_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("powersim.json");
        let tsv_path = out_dir.join("power_curve.tsv");
        let units_tsv_path = out_dir.join("units.tsv");
        Self {
            config,
            write_json,
            write_tsv,
            write_units_tsv,
            cancel: CancellationToken::new(),
            design: None,
            grid: Vec::new(),
            run: None,
            curve: None,
            warnings: Vec::new(),
            output: OutputPaths {
                out_dir,
                json_path,
                tsv_path,
                units_tsv_path,
            },
            tool_version: tool_version.to_string(),
        }
    }

    pub fn writes_outputs(&self) -> bool {
        self.write_json || self.write_tsv || self.write_units_tsv
    }

    pub fn design(&self) -> anyhow::Result<&ValidatedDesign> {
        self.design
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("design not validated"))
    }
}
