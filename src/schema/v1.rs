use serde::{Deserialize, Serialize};

use crate::power::PowerRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMeta {
    pub group: String,
    pub time: usize,
    pub mean: f64,
    pub sd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMeta {
    pub groups: Vec<String>,
    pub times: usize,
    pub support_min: i32,
    pub support_max: i32,
    pub cells: Vec<CellMeta>,
    pub model: String,
    pub interaction_test: String,
    pub fitter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMeta {
    pub sample_sizes: Vec<usize>,
    pub replications: usize,
    pub seed: u64,
    pub planned_units: usize,
    pub completed_units: usize,
    pub skipped_units: usize,
    pub failed_units: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerReportV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub design: DesignMeta,
    pub grid: GridMeta,
    pub alpha: f64,
    pub target_power: f64,
    pub required_sample_size: Option<usize>,
    pub power_curve: Vec<PowerRow>,
    pub warnings: Vec<String>,
}
