use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::io::create_buffered;
use crate::model::ModelSpec;
use crate::schema::v1::{CellMeta, DesignMeta, GridMeta, PowerReportV1};

pub fn build_report(ctx: &Ctx) -> Result<PowerReportV1> {
    let design = ctx.design()?;
    let run = ctx.run.as_ref().context("simulation results missing")?;
    let curve = ctx.curve.as_ref().context("power curve missing")?;
    let assembler = &design.assembler;

    let cells = assembler
        .cells()
        .iter()
        .map(|c| CellMeta {
            group: c.group().to_string(),
            time: c.time(),
            mean: c.mean(),
            sd: c.sd(),
        })
        .collect();

    let design_meta = DesignMeta {
        groups: assembler.groups().to_vec(),
        times: assembler.times(),
        support_min: assembler.support().min(),
        support_max: assembler.support().max(),
        cells,
        model: ModelSpec::group_by_time().to_string(),
        interaction_test: design.interaction.to_string(),
        fitter: run.fitter.to_string(),
    };

    let grid = GridMeta {
        sample_sizes: design.sample_sizes.clone(),
        replications: design.replications,
        seed: design.driver.base_seed,
        planned_units: run.planned,
        completed_units: run.results.len(),
        skipped_units: run.skipped,
        failed_units: run.failed(),
        cancelled: run.cancelled,
        elapsed_ms: run.elapsed_ms,
    };

    Ok(PowerReportV1 {
        tool: "kira-powersim".to_string(),
        version: ctx.tool_version.clone(),
        schema_version: "v1".to_string(),
        design: design_meta,
        grid,
        alpha: curve.alpha,
        target_power: design.target_power,
        required_sample_size: curve.required_sample_size(design.target_power),
        power_curve: curve.rows.clone(),
        warnings: ctx.warnings.clone(),
    })
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx)?;
    let mut writer = create_buffered(path)?;
    serde_json::to_writer_pretty(&mut writer, &report)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
