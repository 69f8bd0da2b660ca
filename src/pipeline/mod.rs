use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_design;
pub mod stage2_grid;
pub mod stage3_simulate;
pub mod stage4_power;
pub mod stage5_output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Every stage of a power run, in order. The design is validated before
    /// the output directory is touched.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(stage1_design::Stage1Design::new()),
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage2_grid::Stage2Grid::new()),
            Box::new(stage3_simulate::Stage3Simulate::new()),
            Box::new(stage4_power::Stage4Power::new()),
            Box::new(stage5_output::Stage5Output::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        info!(
            parallel = cfg!(feature = "mt"),
            threads = ctx.config.threads,
            "compute backend selected"
        );
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
