use rand::Rng;

use crate::design::subject_id;
use crate::error::SimError;
use crate::sampler::{DiscreteSampler, NormalDensity, OutcomeSupport};

/// Values and subject ids drawn for one (group, time) cell.
#[derive(Debug, Clone)]
pub struct CellDraw {
    pub subject_ids: Vec<String>,
    pub values: Vec<i32>,
}

/// Generator for one design cell. The discretized normal weights are computed
/// once and reused for every replication.
#[derive(Debug, Clone)]
pub struct CellGenerator {
    group: String,
    time: usize,
    mean: f64,
    sd: f64,
    sampler: DiscreteSampler,
}

impl CellGenerator {
    pub fn new(
        group: &str,
        time: usize,
        mean: f64,
        sd: f64,
        support: &OutcomeSupport,
    ) -> Result<Self, SimError> {
        if !sd.is_finite() || sd <= 0.0 {
            return Err(SimError::invalid_parameter(
                "sd",
                format!("cell {}/t{}: sd {} must be > 0", group, time, sd),
            ));
        }
        if !mean.is_finite() {
            return Err(SimError::invalid_parameter(
                "mean",
                format!("cell {}/t{}: mean {} is not finite", group, time, mean),
            ));
        }
        let density = NormalDensity::new(mean, sd)?;
        let sampler = DiscreteSampler::from_density(support, &density).map_err(|e| match e {
            SimError::InvalidDistribution(msg) => SimError::InvalidDistribution(format!(
                "cell {}/t{} (mean {}, sd {}): {}",
                group, time, mean, sd, msg
            )),
            other => other,
        })?;
        Ok(Self {
            group: group.to_string(),
            time,
            mean,
            sd,
            sampler,
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn time(&self) -> usize {
        self.time
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    pub fn generate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<CellDraw, SimError> {
        if n < 1 {
            return Err(SimError::invalid_parameter(
                "sample_size",
                "must be at least 1",
            ));
        }
        let values = self.sampler.sample_n(rng, n);
        let subject_ids = (1..=n).map(|i| subject_id(&self.group, i)).collect();
        Ok(CellDraw {
            subject_ids,
            values,
        })
    }
}
