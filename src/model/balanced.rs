//! Closed-form REML for balanced group x time designs with a random intercept.
//!
//! With every subject observed once at every time point and equal group sizes,
//! the REML estimates follow from the split-plot sums of squares:
//! subject variance `(MS_subject - MS_error) / T`, residual variance `MS_error`.
//! A non-positive subject variance is a boundary (singular) fit; the subject
//! variance is then fixed at zero and the residual variance pooled over both
//! strata. Degrees of freedom use Satterthwaite's approximation, which is exact
//! for the within-subject terms.

use std::collections::HashMap;

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::design::SimulatedDataset;
use crate::model::{FTest, FitFailure, MixedModelFitter, ModelFit, ModelSpec, Term, TermEstimate};

const MIN_VARIANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedReml;

impl BalancedReml {
    pub fn new() -> Self {
        Self
    }
}

impl MixedModelFitter for BalancedReml {
    fn name(&self) -> &'static str {
        "balanced_reml"
    }

    fn fit(&self, data: &SimulatedDataset, spec: &ModelSpec) -> Result<ModelFit, FitFailure> {
        if *spec != ModelSpec::group_by_time() {
            return Err(FitFailure::UnsupportedModel(spec.to_string()));
        }
        let layout = Layout::from_dataset(data)?;
        layout.fit()
    }
}

/// Subjects x time matrix of a balanced dataset.
struct Layout {
    n_groups: usize,
    n_times: usize,
    per_group: usize,
    subject_group: Vec<usize>,
    rows: Vec<Vec<f64>>,
}

impl Layout {
    fn from_dataset(data: &SimulatedDataset) -> Result<Self, FitFailure> {
        let n_groups = data.groups().len();
        let n_times = data.times();
        if n_groups < 2 {
            return Err(FitFailure::NotEstimable(
                "group needs at least two levels".to_string(),
            ));
        }
        if n_times < 2 {
            return Err(FitFailure::NotEstimable(
                "time needs at least two levels".to_string(),
            ));
        }

        let mut index: HashMap<(usize, &str), usize> = HashMap::new();
        let mut subject_group = Vec::new();
        let mut cells: Vec<Vec<Option<f64>>> = Vec::new();
        for obs in data.observations() {
            if obs.group >= n_groups || obs.time < 1 || obs.time > n_times {
                return Err(FitFailure::Unbalanced(format!(
                    "observation for {} outside the design",
                    obs.subject_id
                )));
            }
            let next = cells.len();
            let idx = *index
                .entry((obs.group, obs.subject_id.as_str()))
                .or_insert(next);
            if idx == next {
                cells.push(vec![None; n_times]);
                subject_group.push(obs.group);
            }
            let slot = &mut cells[idx][obs.time - 1];
            if slot.is_some() {
                return Err(FitFailure::Unbalanced(format!(
                    "{} measured twice at time {}",
                    obs.subject_id, obs.time
                )));
            }
            *slot = Some(obs.value as f64);
        }

        let rows = cells
            .into_iter()
            .map(|r| r.into_iter().collect::<Option<Vec<f64>>>())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| FitFailure::Unbalanced("missing repeated measure".to_string()))?;

        let mut counts = vec![0usize; n_groups];
        for &g in &subject_group {
            counts[g] += 1;
        }
        let per_group = counts[0];
        if counts.iter().any(|&c| c != per_group) {
            return Err(FitFailure::Unbalanced(format!(
                "unequal subjects per group: {:?}",
                counts
            )));
        }
        if per_group < 2 {
            return Err(FitFailure::NotEstimable(
                "at least two subjects per group are required".to_string(),
            ));
        }

        Ok(Self {
            n_groups,
            n_times,
            per_group,
            subject_group,
            rows,
        })
    }

    fn fit(&self) -> Result<ModelFit, FitFailure> {
        let (g_levels, t_levels) = (self.n_groups, self.n_times);
        let n = self.per_group as f64;
        let t = t_levels as f64;

        let mut cell = vec![vec![0.0f64; t_levels]; g_levels];
        for (row, &g) in self.rows.iter().zip(&self.subject_group) {
            for (k, y) in row.iter().enumerate() {
                cell[g][k] += y;
            }
        }
        for means in cell.iter_mut() {
            for m in means.iter_mut() {
                *m /= n;
            }
        }
        let group_mean: Vec<f64> = cell.iter().map(|c| c.iter().sum::<f64>() / t).collect();
        let time_mean: Vec<f64> = (0..t_levels)
            .map(|k| cell.iter().map(|c| c[k]).sum::<f64>() / g_levels as f64)
            .collect();
        let grand = group_mean.iter().sum::<f64>() / g_levels as f64;

        let mut ss_subject = 0.0;
        let mut ss_error = 0.0;
        for (row, &g) in self.rows.iter().zip(&self.subject_group) {
            let subject_mean = row.iter().sum::<f64>() / t;
            ss_subject += t * (subject_mean - group_mean[g]).powi(2);
            for (k, y) in row.iter().enumerate() {
                ss_error += (y - subject_mean - cell[g][k] + group_mean[g]).powi(2);
            }
        }
        let df_subject = (g_levels as f64) * (n - 1.0);
        let df_error = df_subject * (t - 1.0);
        let ms_subject = ss_subject / df_subject;
        let ms_error = ss_error / df_error;

        let strata = if (ms_subject - ms_error) / t > 0.0 {
            Strata::Split {
                ms_subject,
                df_subject,
                ms_error,
                df_error,
            }
        } else {
            Strata::Pooled {
                ms: (ss_subject + ss_error) / (df_subject + df_error),
                df: df_subject + df_error,
            }
        };
        let residual_variance = strata.residual_variance();
        if !residual_variance.is_finite() || residual_variance <= MIN_VARIANCE {
            return Err(FitFailure::Singular(
                "residual variance is zero".to_string(),
            ));
        }
        let subject_variance = match strata {
            Strata::Split { .. } => (ms_subject - ms_error) / t,
            Strata::Pooled { .. } => 0.0,
        };

        // Weights on (MS_subject, MS_error) of each coefficient's sampling variance.
        let cell_var = (1.0 / (n * t), (t - 1.0) / (n * t));
        let mut terms = Vec::with_capacity(g_levels * t_levels);
        terms.push(estimate(Term::Intercept, cell[0][0], cell_var, &strata)?);
        for tk in 1..t_levels {
            terms.push(estimate(
                Term::Time { level: tk },
                cell[0][tk] - cell[0][0],
                (0.0, 2.0 / n),
                &strata,
            )?);
        }
        for g in 1..g_levels {
            terms.push(estimate(
                Term::Group { level: g },
                cell[g][0] - cell[0][0],
                (2.0 * cell_var.0, 2.0 * cell_var.1),
                &strata,
            )?);
        }
        for g in 1..g_levels {
            for tk in 1..t_levels {
                terms.push(estimate(
                    Term::Interaction { group: g, time: tk },
                    cell[g][tk] - cell[g][0] - cell[0][tk] + cell[0][0],
                    (0.0, 4.0 / n),
                    &strata,
                )?);
            }
        }

        let mut ss_interaction = 0.0;
        for g in 0..g_levels {
            for tk in 0..t_levels {
                ss_interaction += (cell[g][tk] - group_mean[g] - time_mean[tk] + grand).powi(2);
            }
        }
        ss_interaction *= n;
        let numer_df = ((g_levels - 1) * (t_levels - 1)) as f64;
        let denom_df = strata.residual_df();
        let f_value = (ss_interaction / numer_df) / residual_variance;
        let f_dist = FisherSnedecor::new(numer_df, denom_df)
            .map_err(|e| FitFailure::Numerical(e.to_string()))?;
        let interaction = FTest {
            numer_df,
            denom_df,
            f_value,
            p_value: f_dist.sf(f_value),
        };

        Ok(ModelFit {
            terms,
            interaction,
            subject_variance,
            residual_variance,
            singular: matches!(strata, Strata::Pooled { .. }),
            n_subjects: self.rows.len(),
            n_obs: self.rows.len() * t_levels,
        })
    }
}

enum Strata {
    Split {
        ms_subject: f64,
        df_subject: f64,
        ms_error: f64,
        df_error: f64,
    },
    Pooled {
        ms: f64,
        df: f64,
    },
}

impl Strata {
    fn residual_variance(&self) -> f64 {
        match *self {
            Strata::Split { ms_error, .. } => ms_error,
            Strata::Pooled { ms, .. } => ms,
        }
    }

    fn residual_df(&self) -> f64 {
        match *self {
            Strata::Split { df_error, .. } => df_error,
            Strata::Pooled { df, .. } => df,
        }
    }

    /// Variance `a * MS_subject + b * MS_error` and its Satterthwaite df.
    fn combine(&self, (a, b): (f64, f64)) -> (f64, f64) {
        match *self {
            Strata::Split {
                ms_subject,
                df_subject,
                ms_error,
                df_error,
            } => {
                let s = a * ms_subject;
                let e = b * ms_error;
                let var = s + e;
                let df = var * var / (s * s / df_subject + e * e / df_error);
                (var, df)
            }
            Strata::Pooled { ms, df } => ((a + b) * ms, df),
        }
    }
}

fn estimate(
    term: Term,
    value: f64,
    weights: (f64, f64),
    strata: &Strata,
) -> Result<TermEstimate, FitFailure> {
    let (var, df) = strata.combine(weights);
    let std_error = var.sqrt();
    if !std_error.is_finite() || std_error <= 0.0 || !df.is_finite() || df <= 0.0 {
        return Err(FitFailure::Numerical(format!(
            "{}: standard error {} on {} df",
            term, std_error, df
        )));
    }
    let t_value = value / std_error;
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| FitFailure::Numerical(e.to_string()))?;
    Ok(TermEstimate {
        term,
        estimate: value,
        std_error,
        df,
        t_value,
        p_value: (2.0 * dist.sf(t_value.abs())).min(1.0),
    })
}
