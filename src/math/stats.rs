//! Descriptive statistics and interval helpers.

use statrs::distribution::{ContinuousCDF, Normal};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two values.
pub fn sample_sd(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Standard error of a proportion estimated from `trials` Bernoulli draws.
pub fn proportion_se(p: f64, trials: usize) -> f64 {
    if trials == 0 {
        return f64::NAN;
    }
    (p * (1.0 - p) / trials as f64).sqrt()
}

/// Wilson score interval for `successes` out of `trials` at the given confidence.
pub fn wilson_interval(successes: usize, trials: usize, confidence: f64) -> (f64, f64) {
    if trials == 0 {
        return (f64::NAN, f64::NAN);
    }
    let z = match Normal::new(0.0, 1.0) {
        Ok(std) => std.inverse_cdf(0.5 + confidence / 2.0),
        Err(_) => return (f64::NAN, f64::NAN),
    };
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((centre - half).max(0.0), (centre + half).min(1.0))
}
