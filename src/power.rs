//! Empirical power per sample size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::math::stats::{proportion_se, wilson_interval};
use crate::sim::{FitOutcome, UnitResult};

const INTERVAL_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRow {
    pub sample_size: usize,
    /// `None` when every unit at this sample size failed to fit.
    pub power: Option<f64>,
    pub total_units: usize,
    pub failed_units: usize,
    pub significant_units: usize,
    pub mc_se: Option<f64>,
    pub ci_low: Option<f64>,
    pub ci_high: Option<f64>,
}

impl PowerRow {
    pub fn fitted_units(&self) -> usize {
        self.total_units - self.failed_units
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerCurve {
    pub alpha: f64,
    /// Ascending by sample size.
    pub rows: Vec<PowerRow>,
}

impl PowerCurve {
    pub fn power_at(&self, sample_size: usize) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.sample_size == sample_size)
            .and_then(|r| r.power)
    }

    /// Smallest sample size whose power reaches `target`.
    pub fn required_sample_size(&self, target: f64) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| r.power.is_some_and(|p| p >= target))
            .map(|r| r.sample_size)
    }

    pub fn total_failed(&self) -> usize {
        self.rows.iter().map(|r| r.failed_units).sum()
    }
}

pub fn aggregate(results: &[UnitResult], alpha: f64) -> Result<PowerCurve, SimError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(SimError::invalid_parameter(
            "alpha",
            format!("{} must be in (0, 1)", alpha),
        ));
    }

    #[derive(Default)]
    struct Counts {
        total: usize,
        failed: usize,
        significant: usize,
    }

    let mut by_size: BTreeMap<usize, Counts> = BTreeMap::new();
    for r in results {
        let counts = by_size.entry(r.unit.sample_size).or_default();
        counts.total += 1;
        match &r.outcome {
            FitOutcome::Ok(fit) if fit.p_value <= alpha => counts.significant += 1,
            FitOutcome::Ok(_) => {}
            FitOutcome::Failed { .. } => counts.failed += 1,
        }
    }

    let rows = by_size
        .into_iter()
        .map(|(sample_size, c)| {
            let fitted = c.total - c.failed;
            let (power, mc_se, ci) = if fitted == 0 {
                (None, None, None)
            } else {
                let p = c.significant as f64 / fitted as f64;
                (
                    Some(p),
                    Some(proportion_se(p, fitted)),
                    Some(wilson_interval(c.significant, fitted, INTERVAL_CONFIDENCE)),
                )
            };
            PowerRow {
                sample_size,
                power,
                total_units: c.total,
                failed_units: c.failed,
                significant_units: c.significant,
                mc_se,
                ci_low: ci.map(|(lo, _)| lo),
                ci_high: ci.map(|(_, hi)| hi),
            }
        })
        .collect();

    Ok(PowerCurve { alpha, rows })
}
