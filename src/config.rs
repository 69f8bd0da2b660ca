//! Run configuration: the experiment design plus grid and evaluation settings.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::design::DatasetAssembler;
use crate::error::SimError;
use crate::grid::{SampleSizeRange, check_grid};
use crate::model::InteractionTest;
use crate::sampler::OutcomeSupport;
use crate::sim::DriverOptions;

/// Sample sizes to test: a linear range or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleSizes {
    Range(SampleSizeRange),
    List(Vec<usize>),
}

impl SampleSizes {
    pub fn sequence(&self) -> Result<Vec<usize>, SimError> {
        match self {
            SampleSizes::Range(range) => range.sequence(),
            SampleSizes::List(list) => Ok(list.clone()),
        }
    }
}

impl Default for SampleSizes {
    fn default() -> Self {
        SampleSizes::Range(SampleSizeRange::default())
    }
}

/// Inclusive outcome bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for SupportBounds {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

/// Interaction term that decides significance, by label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionSelector {
    /// Last group at the last time point.
    #[default]
    LastCell,
    /// `time` is the 1-based time point; time 1 is the reference level.
    Coefficient { group: String, time: usize },
    Omnibus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignConfig {
    pub groups: Vec<String>,
    pub times: usize,
    /// Group-major: every time point of the first group, then the next group.
    pub means: Vec<f64>,
    pub sds: Vec<f64>,
    pub support: SupportBounds,
    pub sample_sizes: SampleSizes,
    pub replications: usize,
    pub alpha: f64,
    pub target_power: f64,
    pub seed: u64,
    pub threads: usize,
    pub timeout_secs: Option<u64>,
    pub interaction: InteractionSelector,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            groups: vec!["control".to_string(), "treatment".to_string()],
            times: 2,
            means: vec![50.0, 50.0, 50.0, 45.0],
            sds: vec![10.0; 4],
            support: SupportBounds::default(),
            sample_sizes: SampleSizes::default(),
            replications: 100,
            alpha: 0.05,
            target_power: 0.8,
            seed: 42,
            threads: 0,
            timeout_secs: None,
            interaction: InteractionSelector::default(),
        }
    }
}

/// Design checked for consistency, ready to drive a run.
#[derive(Debug, Clone)]
pub struct ValidatedDesign {
    pub assembler: DatasetAssembler,
    pub sample_sizes: Vec<usize>,
    pub replications: usize,
    pub alpha: f64,
    pub target_power: f64,
    pub interaction: InteractionTest,
    pub driver: DriverOptions,
}

impl DesignConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse design config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize design config")
    }

    /// Checks the whole design before any sampling. Every error names the
    /// offending parameter.
    pub fn validate(&self) -> Result<ValidatedDesign, SimError> {
        if self.groups.len() < 2 {
            return Err(SimError::invalid_parameter(
                "groups",
                format!("at least two groups are required, got {}", self.groups.len()),
            ));
        }
        let mut seen = HashSet::new();
        for label in &self.groups {
            if label.trim().is_empty() {
                return Err(SimError::invalid_parameter("groups", "empty group label"));
            }
            if !seen.insert(label.as_str()) {
                return Err(SimError::invalid_parameter(
                    "groups",
                    format!("duplicate group label {}", label),
                ));
            }
        }
        if self.times < 2 {
            return Err(SimError::invalid_parameter(
                "times",
                format!("at least two time points are required, got {}", self.times),
            ));
        }
        let support = OutcomeSupport::from_bounds(self.support.min, self.support.max)?;

        // Shape first: a mismatch is a configuration bug, reported before any cell is built.
        let expected = self.groups.len() * self.times;
        if self.means.len() != expected || self.sds.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                means: self.means.len(),
                sds: self.sds.len(),
            });
        }
        if let Some((i, sd)) = self
            .sds
            .iter()
            .enumerate()
            .find(|(_, sd)| !sd.is_finite() || **sd <= 0.0)
        {
            return Err(SimError::invalid_parameter(
                "sds",
                format!("sds[{}] = {} must be > 0", i, sd),
            ));
        }
        if let Some((i, m)) = self.means.iter().enumerate().find(|(_, m)| !m.is_finite()) {
            return Err(SimError::invalid_parameter(
                "means",
                format!("means[{}] = {} is not finite", i, m),
            ));
        }

        check_unit_interval("alpha", self.alpha)?;
        check_unit_interval("target_power", self.target_power)?;

        let sample_sizes = self.sample_sizes.sequence()?;
        check_grid(&sample_sizes, self.replications)?;

        let interaction = self.resolve_interaction()?;
        let assembler =
            DatasetAssembler::new(&self.groups, self.times, &self.means, &self.sds, &support)?;

        Ok(ValidatedDesign {
            assembler,
            sample_sizes,
            replications: self.replications,
            alpha: self.alpha,
            target_power: self.target_power,
            interaction,
            driver: DriverOptions {
                base_seed: self.seed,
                threads: self.threads,
                timeout: self.timeout_secs.map(Duration::from_secs),
            },
        })
    }

    fn resolve_interaction(&self) -> Result<InteractionTest, SimError> {
        match &self.interaction {
            InteractionSelector::LastCell => {
                Ok(InteractionTest::last_cell(self.groups.len(), self.times))
            }
            InteractionSelector::Omnibus => Ok(InteractionTest::Omnibus),
            InteractionSelector::Coefficient { group, time } => {
                let level = self
                    .groups
                    .iter()
                    .position(|g| g == group)
                    .ok_or_else(|| {
                        SimError::invalid_parameter(
                            "interaction.group",
                            format!("unknown group {}", group),
                        )
                    })?;
                if level == 0 {
                    return Err(SimError::invalid_parameter(
                        "interaction.group",
                        format!("{} is the reference group", group),
                    ));
                }
                if *time < 2 || *time > self.times {
                    return Err(SimError::invalid_parameter(
                        "interaction.time",
                        format!("time {} must be in 2..={}", time, self.times),
                    ));
                }
                Ok(InteractionTest::Coefficient {
                    group: level,
                    time: time - 1,
                })
            }
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), SimError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(
            name,
            format!("{} must be in (0, 1)", value),
        ))
    }
}
