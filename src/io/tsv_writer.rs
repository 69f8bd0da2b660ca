use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::design::SimulatedDataset;
use crate::io::{create_buffered, fmt_opt};
use crate::power::PowerCurve;
use crate::sim::{FitOutcome, UnitResult};

pub fn write_power_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let curve = ctx.curve.as_ref().context("power curve missing")?;
    let mut w = create_buffered(path)?;
    write_power_curve(&mut w, curve)?;
    w.flush()?;
    Ok(())
}

pub fn write_power_curve<W: Write>(w: &mut W, curve: &PowerCurve) -> Result<()> {
    writeln!(
        w,
        "sample_size\tpower\ttotal_units\tfailed_units\tsignificant_units\tmc_se\tci_low\tci_high"
    )?;
    for row in &curve.rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.sample_size,
            fmt_opt(row.power),
            row.total_units,
            row.failed_units,
            row.significant_units,
            fmt_opt(row.mc_se),
            fmt_opt(row.ci_low),
            fmt_opt(row.ci_high)
        )?;
    }
    Ok(())
}

pub fn write_units_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let run = ctx.run.as_ref().context("simulation results missing")?;
    let mut w = create_buffered(path)?;
    write_units(&mut w, &run.results)?;
    w.flush()?;
    Ok(())
}

pub fn write_units<W: Write>(w: &mut W, results: &[UnitResult]) -> Result<()> {
    writeln!(
        w,
        "sample_size\treplication\tstatus\testimate\tstd_error\tdf\tstatistic\tp_value\treason"
    )?;
    for r in results {
        match &r.outcome {
            FitOutcome::Ok(fit) => writeln!(
                w,
                "{}\t{}\tok\t{}\t{}\t{}\t{}\t{}\t",
                r.unit.sample_size,
                r.unit.replication,
                fmt_opt(fit.estimate),
                fmt_opt(fit.std_error),
                fmt_opt(Some(fit.df)),
                fmt_opt(Some(fit.statistic)),
                fmt_opt(Some(fit.p_value))
            )?,
            FitOutcome::Failed { reason } => writeln!(
                w,
                "{}\t{}\tfailed\tNA\tNA\tNA\tNA\tNA\t{}",
                r.unit.sample_size,
                r.unit.replication,
                reason.replace(['\t', '\n'], " ")
            )?,
        }
    }
    Ok(())
}

/// Long format, one row per subject x time.
pub fn write_dataset<W: Write>(w: &mut W, dataset: &SimulatedDataset) -> Result<()> {
    writeln!(w, "subject_id\tgroup\ttime\tvalue")?;
    for obs in dataset.observations() {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            obs.subject_id,
            dataset.group_label(obs),
            obs.time,
            obs.value
        )?;
    }
    Ok(())
}
