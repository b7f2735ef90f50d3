//! Summary statistics over small reference samples.

use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of `log10` of a positive sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    /// Mean of `log10(x)`.
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator) of `log10(x)`.
    pub sd: f64,
    /// Number of observations.
    pub n: usize,
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with Bessel's correction.
///
/// `None` when fewer than two values are given.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Summarise `log10` of a sample.
///
/// Returns `None` if the sample has fewer than two observations or any value
/// is not a finite, strictly positive number.
pub fn log10_summary(values: &[f64]) -> Option<LogSummary> {
    if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return None;
    }
    let logs: Vec<f64> = values.iter().map(|v| v.log10()).collect();
    Some(LogSummary {
        mean: mean(&logs)?,
        sd: sample_std_dev(&logs)?,
        n: logs.len(),
    })
}
