use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::design::CellSummary;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let design = ctx.design()?;
    let run = ctx.run.as_ref().context("simulation results missing")?;
    let curve = ctx.curve.as_ref().context("power curve missing")?;
    let assembler = &design.assembler;

    let mut out = String::new();
    out.push_str(&format!("kira-powersim v{}\n", ctx.tool_version));
    out.push_str(&format!(
        "Design: {} groups x {} times, support {}..{}, test={}\n",
        assembler.groups().len(),
        assembler.times(),
        assembler.support().min(),
        assembler.support().max(),
        design.interaction
    ));
    out.push_str(&format!(
        "Grid: {} sample sizes x {} replications ({} of {} units run, {} failed)\n",
        design.sample_sizes.len(),
        design.replications,
        run.results.len(),
        run.planned,
        run.failed()
    ));
    for row in &curve.rows {
        let power = match row.power {
            Some(p) => format!("{:.3}", p),
            None => "NA".to_string(),
        };
        out.push_str(&format!(
            "n={}: power={} ({}/{}, failed {})\n",
            row.sample_size,
            power,
            row.significant_units,
            row.fitted_units(),
            row.failed_units
        ));
    }
    match curve.required_sample_size(design.target_power) {
        Some(n) => out.push_str(&format!(
            "Required n (power >= {:.2}, alpha = {}): {}\n",
            design.target_power, curve.alpha, n
        )),
        None => out.push_str(&format!(
            "Required n (power >= {:.2}, alpha = {}): not reached\n",
            design.target_power, curve.alpha
        )),
    }
    if run.cancelled {
        out.push_str("Status: cancelled (partial results)\n");
    }

    Ok(out)
}

pub fn format_cell_summaries(cells: &[CellSummary]) -> String {
    let mut out = String::new();
    for c in cells {
        out.push_str(&format!(
            "{}\tt{}\tn={}\tmean={:.3}\tsd={:.3}\n",
            c.group, c.time, c.n, c.mean, c.sd
        ));
    }
    out
}
