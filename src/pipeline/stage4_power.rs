use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::power::aggregate;

pub struct Stage4Power;

impl Stage4Power {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Power {
    fn name(&self) -> &'static str {
        "stage4_power"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let run = ctx.run.as_ref().context("simulation results missing")?;
        let design = ctx.design()?;
        let curve = aggregate(&run.results, design.alpha)?;

        let mut warnings = Vec::new();
        for row in &curve.rows {
            if row.power.is_none() {
                warnings.push(format!(
                    "n={}: all {} units failed to fit",
                    row.sample_size, row.total_units
                ));
            } else if row.failed_units > 0 {
                warnings.push(format!(
                    "n={}: {} of {} units failed to fit",
                    row.sample_size, row.failed_units, row.total_units
                ));
            }
        }

        info!(
            rows = curve.rows.len(),
            failed = curve.total_failed(),
            required_n = ?curve.required_sample_size(design.target_power),
            "power_curve_ready"
        );
        ctx.warnings.extend(warnings);
        ctx.curve = Some(curve);
        Ok(())
    }
}
