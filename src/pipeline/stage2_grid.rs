use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::grid::build_grid;
use crate::pipeline::Stage;

pub struct Stage2Grid;

impl Stage2Grid {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Grid {
    fn name(&self) -> &'static str {
        "stage2_grid"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let design = ctx.design()?;
        let grid = build_grid(&design.sample_sizes, design.replications)?;
        info!(units = grid.len(), "grid_ready");
        ctx.grid = grid;
        Ok(())
    }
}
