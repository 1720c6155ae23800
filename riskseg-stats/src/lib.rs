#![warn(missing_docs)]
//! riskseg Statistical Engine
//!
//! Numeric building blocks for segment hypothesis testing:
//! - Descriptive summaries of a sample (mean, sample variance, median)
//! - Chi-squared test of independence on a contingency table
//! - Two-sample t-test (pooled or Welch) and large-sample z-test
//! - Effect size (Cohen's d) with conventional interpretation
//! - Significance interpretation and the small/large sample test policy

mod contingency;
mod means;
mod significance;
mod summary;

pub use contingency::{
    ChiSquaredResult, ContingencyError, ContingencyTable, chi_squared_independence,
};
pub use means::{
    EffectInterpretation, MeanTestError, MeanTestResult, VarianceAssumption, cohens_d,
    interpret_effect_size, t_test, z_test,
};
pub use significance::{Interpretation, TestKind, choose_test, choose_test_with_threshold, interpret};
pub use summary::{SampleSummary, compute_median, compute_summary};

/// Default significance threshold
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Per-group observation count above which the z-test replaces the t-test
pub const LARGE_SAMPLE_THRESHOLD: usize = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(LARGE_SAMPLE_THRESHOLD, 30);
        assert!((DEFAULT_ALPHA - 0.05).abs() < f64::EPSILON);
    }
}
