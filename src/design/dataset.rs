use rand::Rng;

use crate::design::{CellGenerator, CellParams, Observation, SimulatedDataset};
use crate::error::SimError;
use crate::sampler::OutcomeSupport;

/// Builds one long-format dataset per replication from the per-cell design.
///
/// Cells are enumerated group-major: every time point of the first group, then
/// every time point of the second, matching the order of the supplied
/// parameters.
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    groups: Vec<String>,
    times: usize,
    support: OutcomeSupport,
    cells: Vec<CellGenerator>,
}

impl DatasetAssembler {
    pub fn new(
        groups: &[String],
        times: usize,
        means: &[f64],
        sds: &[f64],
        support: &OutcomeSupport,
    ) -> Result<Self, SimError> {
        let expected = groups.len() * times;
        if means.len() != expected || sds.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                means: means.len(),
                sds: sds.len(),
            });
        }
        if support.is_empty() {
            return Err(SimError::InvalidDistribution(
                "support is empty".to_string(),
            ));
        }

        let mut cells = Vec::with_capacity(expected);
        for (g, group) in groups.iter().enumerate() {
            for t in 0..times {
                let idx = g * times + t;
                cells.push(CellGenerator::new(group, t + 1, means[idx], sds[idx], support)?);
            }
        }

        Ok(Self {
            groups: groups.to_vec(),
            times,
            support: support.clone(),
            cells,
        })
    }

    pub fn from_params(
        groups: &[String],
        times: usize,
        params: &[CellParams],
        support: &OutcomeSupport,
    ) -> Result<Self, SimError> {
        let means: Vec<f64> = params.iter().map(|p| p.mean).collect();
        let sds: Vec<f64> = params.iter().map(|p| p.sd).collect();
        Self::new(groups, times, &means, &sds, support)
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn times(&self) -> usize {
        self.times
    }

    pub fn support(&self) -> &OutcomeSupport {
        &self.support
    }

    pub fn cells(&self) -> &[CellGenerator] {
        &self.cells
    }

    /// Draws every cell with `n` subjects per group.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<SimulatedDataset, SimError> {
        if n < 1 {
            return Err(SimError::invalid_parameter(
                "sample_size",
                "must be at least 1",
            ));
        }
        let mut observations = Vec::with_capacity(n * self.cells.len());
        for (idx, cell) in self.cells.iter().enumerate() {
            let draw = cell.generate(n, rng)?;
            let group = idx / self.times;
            observations.extend(draw.subject_ids.into_iter().zip(draw.values).map(
                |(subject_id, value)| Observation {
                    subject_id,
                    group,
                    time: cell.time(),
                    value,
                },
            ));
        }
        Ok(SimulatedDataset::new(
            self.groups.clone(),
            self.times,
            observations,
        ))
    }
}
