//! Simulation grid: sample sizes crossed with replication indices.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Linear sample-size sequence `min, min + step, ...` up to and including `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSizeRange {
    pub min: usize,
    pub max: usize,
    pub step: usize,
}

impl SampleSizeRange {
    pub fn sequence(&self) -> Result<Vec<usize>, SimError> {
        if self.min < 1 {
            return Err(SimError::invalid_parameter(
                "sample_sizes.min",
                "must be at least 1",
            ));
        }
        if self.step < 1 {
            return Err(SimError::invalid_parameter(
                "sample_sizes.step",
                "must be at least 1",
            ));
        }
        if self.min > self.max {
            return Err(SimError::invalid_parameter(
                "sample_sizes",
                format!("min {} > max {}", self.min, self.max),
            ));
        }
        Ok((self.min..=self.max).step_by(self.step).collect())
    }
}

impl Default for SampleSizeRange {
    fn default() -> Self {
        Self {
            min: 30,
            max: 90,
            step: 30,
        }
    }
}

/// One (sample size, replication) simulation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridUnit {
    /// Position in the grid.
    pub index: usize,
    /// Subjects per group.
    pub sample_size: usize,
    /// 1-based replication index.
    pub replication: usize,
}

impl GridUnit {
    /// Stream id for the unit's random generator, derived from its coordinates
    /// so that it does not depend on the rest of the grid.
    pub fn stream(&self) -> u64 {
        ((self.sample_size as u64) << 32) | (self.replication as u64 & 0xFFFF_FFFF)
    }
}

pub fn build_grid(sample_sizes: &[usize], replications: usize) -> Result<Vec<GridUnit>, SimError> {
    check_grid(sample_sizes, replications)?;
    let mut units = Vec::with_capacity(sample_sizes.len() * replications);
    for &sample_size in sample_sizes {
        for replication in 1..=replications {
            units.push(GridUnit {
                index: units.len(),
                sample_size,
                replication,
            });
        }
    }
    Ok(units)
}

/// Rejects empty, zero, duplicate or oversized sample sizes and a zero
/// replication count.
pub fn check_grid(sample_sizes: &[usize], replications: usize) -> Result<(), SimError> {
    if sample_sizes.is_empty() {
        return Err(SimError::invalid_parameter(
            "sample_sizes",
            "sequence is empty",
        ));
    }
    if let Some(n) = sample_sizes.iter().find(|n| **n < 1) {
        return Err(SimError::invalid_parameter(
            "sample_sizes",
            format!("sample size {} must be at least 1", n),
        ));
    }
    if replications < 1 {
        return Err(SimError::invalid_parameter(
            "replications",
            "must be at least 1",
        ));
    }
    if let Some(n) = sample_sizes.iter().find(|n| **n as u64 > u32::MAX as u64) {
        return Err(SimError::invalid_parameter(
            "sample_sizes",
            format!("sample size {} is too large", n),
        ));
    }
    for (i, n) in sample_sizes.iter().enumerate() {
        if sample_sizes[..i].contains(n) {
            return Err(SimError::invalid_parameter(
                "sample_sizes",
                format!("sample size {} listed twice", n),
            ));
        }
    }

    Ok(())
}
