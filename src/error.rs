//! Error taxonomy for design validation, generation and model fitting.

use crate::model::FitFailure;

/// Errors raised by the simulation engine.
///
/// `InvalidDistribution`, `InvalidParameter` and `DimensionMismatch` describe an
/// inconsistent experiment design and abort the run. `ModelFit` is local to one
/// grid unit; the driver records it instead of propagating it.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error(
        "dimension mismatch: design has {expected} cells (groups x times) but {means} means and {sds} sds were supplied"
    )]
    DimensionMismatch {
        expected: usize,
        means: usize,
        sds: usize,
    },

    #[error("model fit failed: {0}")]
    ModelFit(#[from] FitFailure),
}

impl SimError {
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that mean the design itself is inconsistent.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ModelFit(_))
    }
}
