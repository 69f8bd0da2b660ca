pub mod cell;
pub mod dataset;

pub use cell::{CellDraw, CellGenerator};
pub use dataset::DatasetAssembler;

use crate::math::stats;

/// One simulated measurement in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub subject_id: String,
    /// Index into `SimulatedDataset::groups`.
    pub group: usize,
    /// 1-based time point.
    pub time: usize,
    pub value: i32,
}

/// All observations of one replication, ordered group-major then by time.
#[derive(Debug, Clone)]
pub struct SimulatedDataset {
    groups: Vec<String>,
    times: usize,
    observations: Vec<Observation>,
}

impl SimulatedDataset {
    pub fn new(groups: Vec<String>, times: usize, observations: Vec<Observation>) -> Self {
        Self {
            groups,
            times,
            observations,
        }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn times(&self) -> usize {
        self.times
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn group_label(&self, obs: &Observation) -> &str {
        &self.groups[obs.group]
    }

    /// Empirical mean and sd per (group, time) cell, in design order.
    pub fn cell_summaries(&self) -> Vec<CellSummary> {
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); self.groups.len() * self.times];
        for obs in &self.observations {
            if obs.group >= self.groups.len() || obs.time < 1 || obs.time > self.times {
                continue;
            }
            buckets[obs.group * self.times + (obs.time - 1)].push(obs.value as f64);
        }
        buckets
            .into_iter()
            .enumerate()
            .map(|(i, values)| CellSummary {
                group: self.groups[i / self.times].clone(),
                time: i % self.times + 1,
                n: values.len(),
                mean: stats::mean(&values),
                sd: stats::sample_sd(&values),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellSummary {
    pub group: String,
    pub time: usize,
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
}

/// Theoretical parameters of one design cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParams {
    pub mean: f64,
    pub sd: f64,
}

/// Subject identifier shared by every time point of the same subject.
pub fn subject_id(group: &str, index: usize) -> String {
    format!("{}_{}", group, index)
}
