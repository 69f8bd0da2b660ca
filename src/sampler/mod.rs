//! Bounded discrete sampling.
//!
//! A `DiscreteSampler` draws from a finite ordered support with replacement,
//! using any non-negative weight per support point. Weights need not be
//! normalized.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use statrs::distribution::{Continuous, Normal};

use crate::error::SimError;

/// Ordered set of admissible outcome values, `min..=max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeSupport {
    min: i32,
    max: i32,
}

impl OutcomeSupport {
    pub fn from_bounds(min: i32, max: i32) -> Result<Self, SimError> {
        if min > max {
            return Err(SimError::InvalidDistribution(format!(
                "empty support: min {} > max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.max as i64 - self.min as i64 + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.min..=self.max
    }
}

impl Default for OutcomeSupport {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

/// Per-point weight function over the support.
pub trait Density {
    fn density(&self, x: f64) -> f64;
}

impl<F> Density for F
where
    F: Fn(f64) -> f64,
{
    fn density(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Normal density evaluated at support points (the default family).
#[derive(Debug, Clone, Copy)]
pub struct NormalDensity {
    normal: Normal,
}

impl NormalDensity {
    pub fn new(mean: f64, sd: f64) -> Result<Self, SimError> {
        if !mean.is_finite() {
            return Err(SimError::invalid_parameter("mean", format!("{} is not finite", mean)));
        }
        if !sd.is_finite() || sd <= 0.0 {
            return Err(SimError::invalid_parameter("sd", format!("{} must be > 0", sd)));
        }
        let normal = Normal::new(mean, sd)
            .map_err(|e| SimError::invalid_parameter("sd", e.to_string()))?;
        Ok(Self { normal })
    }
}

impl Density for NormalDensity {
    fn density(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }
}

/// Weighted sampler over an `OutcomeSupport`.
#[derive(Debug, Clone)]
pub struct DiscreteSampler {
    values: Vec<i32>,
    index: WeightedIndex<f64>,
}

impl DiscreteSampler {
    pub fn new(support: &OutcomeSupport, weights: &[f64]) -> Result<Self, SimError> {
        let values: Vec<i32> = support.values().collect();
        if values.is_empty() {
            return Err(SimError::InvalidDistribution("support is empty".to_string()));
        }
        if weights.len() != values.len() {
            return Err(SimError::InvalidDistribution(format!(
                "{} weights for {} support values",
                weights.len(),
                values.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SimError::InvalidDistribution(format!(
                "weight {} is negative or not finite",
                w
            )));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(SimError::InvalidDistribution(
                "all weights are zero".to_string(),
            ));
        }
        let index = WeightedIndex::new(weights.iter().copied())
            .map_err(|e| SimError::InvalidDistribution(e.to_string()))?;
        Ok(Self { values, index })
    }

    pub fn from_density<D: Density + ?Sized>(
        support: &OutcomeSupport,
        density: &D,
    ) -> Result<Self, SimError> {
        let weights: Vec<f64> = support.values().map(|v| density.density(v as f64)).collect();
        Self::new(support, &weights)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        self.values[self.index.sample(rng)]
    }

    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<i32> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}
