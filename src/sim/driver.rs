use std::time::{Duration, Instant};

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::design::DatasetAssembler;
use crate::error::SimError;
use crate::grid::GridUnit;
use crate::model::{InteractionTest, MixedModelFitter, ModelSpec};
use crate::sim::{FitOutcome, UnitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub base_seed: u64,
    /// Worker threads (0 = all cores).
    pub threads: usize,
    /// Stop dispatching new units once this much time has passed.
    pub timeout: Option<Duration>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            base_seed: 42,
            threads: 0,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// Completed units in grid order.
    pub results: Vec<UnitResult>,
    pub fitter: &'static str,
    pub planned: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl SimulationRun {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

/// Independent random stream for one unit: the base seed picks the key, the
/// unit's (sample size, replication) picks the stream.
pub fn unit_rng(base_seed: u64, unit: &GridUnit) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    rng.set_stream(unit.stream());
    rng
}

pub struct SimulationDriver<'a> {
    assembler: &'a DatasetAssembler,
    fitter: &'a dyn MixedModelFitter,
    spec: ModelSpec,
    test: InteractionTest,
    options: DriverOptions,
}

impl<'a> SimulationDriver<'a> {
    pub fn new(
        assembler: &'a DatasetAssembler,
        fitter: &'a dyn MixedModelFitter,
        test: InteractionTest,
        options: DriverOptions,
    ) -> Self {
        Self {
            assembler,
            fitter,
            spec: ModelSpec::group_by_time(),
            test,
            options,
        }
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Generates and fits one unit. Only design errors are returned as `Err`;
    /// fit failures become `FitOutcome::Failed`.
    pub fn run_unit(&self, unit: &GridUnit) -> Result<UnitResult, SimError> {
        let mut rng = unit_rng(self.options.base_seed, unit);
        let dataset = self.assembler.assemble(unit.sample_size, &mut rng)?;
        let outcome = match self
            .fitter
            .fit(&dataset, &self.spec)
            .and_then(|fit| self.test.select(&fit))
        {
            Ok(result) if result.p_value.is_finite() => FitOutcome::Ok(result),
            Ok(result) => FitOutcome::Failed {
                reason: format!("non-finite p-value {}", result.p_value),
            },
            Err(failure) => {
                debug!(
                    sample_size = unit.sample_size,
                    replication = unit.replication,
                    fitter = self.fitter.name(),
                    reason = %failure,
                    "unit_fit_failed"
                );
                FitOutcome::Failed {
                    reason: failure.to_string(),
                }
            }
        };
        Ok(UnitResult {
            unit: *unit,
            outcome,
        })
    }

    pub fn run(&self, grid: &[GridUnit], cancel: &CancellationToken) -> Result<SimulationRun> {
        let start = Instant::now();
        let deadline = self.options.timeout.map(|t| start + t);

        let step = |unit: &GridUnit| -> Result<Option<UnitResult>, SimError> {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    cancel.cancel();
                }
            }
            if cancel.is_cancelled() {
                return Ok(None);
            }
            self.run_unit(unit).map(Some)
        };

        #[cfg(feature = "mt")]
        let collected: Vec<Option<UnitResult>> = {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.threads)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
            pool.install(|| grid.par_iter().map(step).collect::<Result<Vec<_>, _>>())?
        };

        #[cfg(not(feature = "mt"))]
        let collected: Vec<Option<UnitResult>> =
            grid.iter().map(step).collect::<Result<Vec<_>, _>>()?;

        let results: Vec<UnitResult> = collected.into_iter().flatten().collect();
        let run = SimulationRun {
            fitter: self.fitter.name(),
            planned: grid.len(),
            skipped: grid.len() - results.len(),
            cancelled: cancel.is_cancelled(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            results,
        };

        if run.cancelled {
            warn!(
                completed = run.results.len(),
                skipped = run.skipped,
                "simulation_cancelled"
            );
        }
        info!(
            planned = run.planned,
            completed = run.results.len(),
            failed = run.failed(),
            elapsed_ms = run.elapsed_ms,
            "simulation_finished"
        );
        Ok(run)
    }
}
