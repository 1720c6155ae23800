//! Sample Summaries
//!
//! Descriptive statistics for one segment's metric values. Variance is the
//! unbiased sample variance (n - 1 denominator), which is what the mean
//! difference tests consume.

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a single sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample variance (ddof = 1), zero for fewer than two observations
    pub variance: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
    /// Median (linear interpolation between middle ranks)
    pub median: f64,
}

/// Compute the summary of a sample
///
/// An empty sample yields an all-zero summary with `count == 0`.
pub fn compute_summary(samples: &[f64]) -> SampleSummary {
    if samples.is_empty() {
        return SampleSummary {
            count: 0,
            mean: 0.0,
            variance: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            median: 0.0,
        };
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;

    let variance = if n < 2 {
        0.0
    } else {
        samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    };

    let min = samples
        .iter()
        .cloned()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);
    let max = samples
        .iter()
        .cloned()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0.0);

    SampleSummary {
        count: n,
        mean,
        variance,
        std_dev: variance.sqrt(),
        min,
        max,
        median: compute_median(samples),
    }
}

/// Median of a sample, 0.0 when empty
pub fn compute_median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl SampleSummary {
    /// Squared standard error of the mean (variance / n)
    pub fn squared_standard_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.variance / self.count as f64
        }
    }

    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }
}
