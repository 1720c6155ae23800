//! Significance Interpretation and Test Selection
//!
//! `interpret` maps a p-value to a decision with a strict `<` comparison, so a
//! p-value exactly equal to alpha fails to reject. `NaN` never compares below
//! alpha and therefore also fails to reject.

use crate::LARGE_SAMPLE_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Decision reached for a hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpretation {
    /// p < alpha
    Reject,
    /// p >= alpha, or p is NaN
    FailToReject,
    /// No p-value: the test was skipped on degenerate input
    Skipped,
}

impl Interpretation {
    /// Whether the null hypothesis was rejected
    pub fn is_rejection(self) -> bool {
        matches!(self, Interpretation::Reject)
    }
}

impl std::fmt::Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interpretation::Reject => write!(f, "Reject the null hypothesis."),
            Interpretation::FailToReject => write!(f, "Fail to reject the null hypothesis."),
            Interpretation::Skipped => write!(f, "Test skipped due to identical values."),
        }
    }
}

/// Interpret a p-value against a significance threshold
pub fn interpret(p_value: Option<f64>, alpha: f64) -> Interpretation {
    match p_value {
        None => Interpretation::Skipped,
        Some(p) if p < alpha => Interpretation::Reject,
        Some(_) => Interpretation::FailToReject,
    }
}

/// Family of statistical test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Chi-squared test of independence
    ChiSquared,
    /// Two-sample t-test
    TTest,
    /// Two-sample z-test (normal approximation)
    ZTest,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKind::ChiSquared => write!(f, "Chi-squared test"),
            TestKind::TTest => write!(f, "T-test"),
            TestKind::ZTest => write!(f, "Z-test"),
        }
    }
}

/// Pick the mean-difference test for two groups using the default threshold
pub fn choose_test(n_a: usize, n_b: usize) -> TestKind {
    choose_test_with_threshold(n_a, n_b, LARGE_SAMPLE_THRESHOLD)
}

/// Pick the z-test only when both groups have more than `threshold` observations
pub fn choose_test_with_threshold(n_a: usize, n_b: usize, threshold: usize) -> TestKind {
    if n_a > threshold && n_b > threshold {
        TestKind::ZTest
    } else {
        TestKind::TTest
    }
}
