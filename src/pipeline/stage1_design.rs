use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage1Design;

impl Stage1Design {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Design {
    fn name(&self) -> &'static str {
        "stage1_design"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let design = ctx
            .config
            .validate()
            .context("inconsistent experiment design")?;

        if ctx.config.timeout_secs == Some(0) {
            ctx.warnings
                .push("timeout_secs = 0 stops the run before any unit".to_string());
        }

        info!(
            groups = design.assembler.groups().len(),
            times = design.assembler.times(),
            cells = design.assembler.cells().len(),
            sample_sizes = design.sample_sizes.len(),
            replications = design.replications,
            interaction = %design.interaction,
            "design_validated"
        );
        ctx.design = Some(design);
        Ok(())
    }
}
