//! Mixed-model fitting contract.
//!
//! The engine only needs `outcome ~ group * time + (1 | subject_id)` fitted per
//! dataset and the group x time interaction read back through an explicit
//! `Term` handle. `BalancedReml` covers the balanced complete designs the
//! assembler produces; other fitters plug in through `MixedModelFitter`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::design::SimulatedDataset;

pub mod balanced;

pub use balanced::BalancedReml;

/// Fixed-effect term under treatment coding. Level 0 of each factor is the
/// reference; `time` levels are 0-based here (level 1 is the second time point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "term", rename_all = "snake_case")]
pub enum Term {
    Intercept,
    Group { level: usize },
    Time { level: usize },
    Interaction { group: usize, time: usize },
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Intercept => write!(f, "(Intercept)"),
            Term::Group { level } => write!(f, "group[{}]", level),
            Term::Time { level } => write!(f, "time[{}]", level),
            Term::Interaction { group, time } => write!(f, "group[{}]:time[{}]", group, time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub response: String,
    pub between: String,
    pub within: String,
    pub random_intercept: String,
}

impl ModelSpec {
    pub fn group_by_time() -> Self {
        Self {
            response: "outcome".to_string(),
            between: "group".to_string(),
            within: "time".to_string(),
            random_intercept: "subject_id".to_string(),
        }
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::group_by_time()
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {} * {} + (1 | {})",
            self.response, self.between, self.within, self.random_intercept
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermEstimate {
    pub term: Term,
    pub estimate: f64,
    pub std_error: f64,
    pub df: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// F-test of a block of terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FTest {
    pub numer_df: f64,
    pub denom_df: f64,
    pub f_value: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    pub terms: Vec<TermEstimate>,
    /// Joint test of every group x time term.
    pub interaction: FTest,
    pub subject_variance: f64,
    pub residual_variance: f64,
    /// Subject variance estimated at the zero boundary.
    pub singular: bool,
    pub n_subjects: usize,
    pub n_obs: usize,
}

impl ModelFit {
    pub fn term(&self, term: Term) -> Option<&TermEstimate> {
        self.terms.iter().find(|t| t.term == term)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitFailure {
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("unbalanced or incomplete data: {0}")]
    Unbalanced(String),

    #[error("term not estimable: {0}")]
    NotEstimable(String),

    #[error("singular fit: {0}")]
    Singular(String),

    #[error("failed to converge: {0}")]
    NonConvergence(String),

    #[error("numerical error: {0}")]
    Numerical(String),
}

/// External statistical primitive fitting a random-intercept linear mixed model.
pub trait MixedModelFitter: Send + Sync {
    fn name(&self) -> &'static str;
    fn fit(&self, data: &SimulatedDataset, spec: &ModelSpec) -> Result<ModelFit, FitFailure>;
}

/// Which interaction statistic decides significance for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionTest {
    /// One interaction coefficient, by group level and 0-based time level.
    Coefficient { group: usize, time: usize },
    /// F-test of all interaction coefficients.
    Omnibus,
}

impl InteractionTest {
    /// Coefficient for the last group at the last time point.
    pub fn last_cell(groups: usize, times: usize) -> Self {
        Self::Coefficient {
            group: groups.saturating_sub(1),
            time: times.saturating_sub(1),
        }
    }

    pub fn select(&self, fit: &ModelFit) -> Result<FitResult, FitFailure> {
        match *self {
            InteractionTest::Coefficient { group, time } => {
                let term = Term::Interaction { group, time };
                let est = fit
                    .term(term)
                    .ok_or_else(|| FitFailure::NotEstimable(format!("{} not in fit", term)))?;
                Ok(FitResult {
                    estimate: Some(est.estimate),
                    std_error: Some(est.std_error),
                    statistic: est.t_value,
                    df: est.df,
                    p_value: est.p_value,
                })
            }
            InteractionTest::Omnibus => Ok(FitResult {
                estimate: None,
                std_error: None,
                statistic: fit.interaction.f_value,
                df: fit.interaction.denom_df,
                p_value: fit.interaction.p_value,
            }),
        }
    }
}

impl fmt::Display for InteractionTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionTest::Coefficient { group, time } => {
                write!(f, "{}", Term::Interaction { group: *group, time: *time })
            }
            InteractionTest::Omnibus => write!(f, "group:time (F)"),
        }
    }
}

/// Interaction statistic extracted for one grid unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Coefficient estimate; absent for the omnibus test.
    pub estimate: Option<f64>,
    pub std_error: Option<f64>,
    /// t value for a coefficient, F value for the omnibus test.
    pub statistic: f64,
    /// Residual (denominator) degrees of freedom.
    pub df: f64,
    pub p_value: f64,
}
