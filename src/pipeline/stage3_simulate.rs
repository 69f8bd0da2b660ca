use anyhow::{Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::model::BalancedReml;
use crate::pipeline::Stage;
use crate::sim::SimulationDriver;

pub struct Stage3Simulate;

impl Stage3Simulate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Simulate {
    fn name(&self) -> &'static str {
        "stage3_simulate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.grid.is_empty() {
            bail!("grid not built before Stage 3");
        }
        let design = ctx.design()?;
        let fitter = BalancedReml::new();
        let driver = SimulationDriver::new(
            &design.assembler,
            &fitter,
            design.interaction,
            design.driver,
        );
        info!(
            model = %driver.spec(),
            seed = design.driver.base_seed,
            "simulation_started"
        );
        let run = driver.run(&ctx.grid, &ctx.cancel)?;

        if run.cancelled {
            ctx.warnings.push(format!(
                "run cancelled: {} of {} units completed",
                run.results.len(),
                run.planned
            ));
        }
        ctx.run = Some(run);
        Ok(())
    }
}
