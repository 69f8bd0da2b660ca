pub mod driver;

pub use driver::{DriverOptions, SimulationDriver, SimulationRun, unit_rng};

use crate::grid::GridUnit;
use crate::model::FitResult;

/// Result of fitting one grid unit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Ok(FitResult),
    Failed { reason: String },
}

impl FitOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FitOutcome::Failed { .. })
    }

    pub fn p_value(&self) -> Option<f64> {
        match self {
            FitOutcome::Ok(r) => Some(r.p_value),
            FitOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitResult {
    pub unit: GridUnit,
    pub outcome: FitOutcome,
}
