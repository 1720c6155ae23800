//! Two-Sample Mean Difference Tests
//!
//! Student's t-test (pooled or Welch variance) for small samples and the
//! normal-approximation z-test for large ones, both two-sided. Each result
//! carries the group summaries and Cohen's d.

use crate::significance::TestKind;
use crate::summary::{SampleSummary, compute_summary};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// How the t-test estimates the variance of the mean difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceAssumption {
    /// Equal variances: pooled estimate, `n_a + n_b - 2` degrees of freedom
    #[default]
    Pooled,
    /// Unequal variances: Welch–Satterthwaite degrees of freedom
    Welch,
}

/// Result of a two-sample mean difference test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanTestResult {
    /// Which test produced this result
    pub kind: TestKind,
    /// Variance assumption, t-tests only
    pub variance_assumption: Option<VarianceAssumption>,
    /// t or z statistic (NaN when undefined)
    pub statistic: f64,
    /// Two-sided p-value (NaN when undefined)
    pub p_value: f64,
    /// Degrees of freedom, t-tests only
    pub degrees_of_freedom: Option<f64>,
    /// Summary of the first group
    pub summary_a: SampleSummary,
    /// Summary of the second group
    pub summary_b: SampleSummary,
    /// mean_a - mean_b
    pub mean_difference: f64,
    /// Cohen's d
    pub effect_size: f64,
    /// Effect size interpretation
    pub effect_interpretation: EffectInterpretation,
}

/// Interpretation of effect size magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectInterpretation {
    /// |d| < 0.2 - negligible difference
    Negligible,
    /// 0.2 <= |d| < 0.5 - small difference
    Small,
    /// 0.5 <= |d| < 0.8 - medium difference
    Medium,
    /// |d| >= 0.8 - large difference
    Large,
}

impl std::fmt::Display for EffectInterpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectInterpretation::Negligible => write!(f, "negligible"),
            EffectInterpretation::Small => write!(f, "small"),
            EffectInterpretation::Medium => write!(f, "medium"),
            EffectInterpretation::Large => write!(f, "large"),
        }
    }
}

/// Errors from mean difference tests
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeanTestError {
    #[error("First group has no observations")]
    EmptyFirst,
    #[error("Second group has no observations")]
    EmptySecond,
    #[error("Distribution error: {0}")]
    Distribution(String),
}

fn validate(a: &[f64], b: &[f64]) -> Result<(SampleSummary, SampleSummary), MeanTestError> {
    if a.is_empty() {
        return Err(MeanTestError::EmptyFirst);
    }
    if b.is_empty() {
        return Err(MeanTestError::EmptySecond);
    }
    Ok((compute_summary(a), compute_summary(b)))
}

/// Two-sample t-test on the difference of means
///
/// Degrees of freedom that are not positive (e.g. two single observations
/// under the pooled assumption) give a NaN statistic and p-value.
pub fn t_test(
    a: &[f64],
    b: &[f64],
    assumption: VarianceAssumption,
) -> Result<MeanTestResult, MeanTestError> {
    let (summary_a, summary_b) = validate(a, b)?;
    let n_a = summary_a.count as f64;
    let n_b = summary_b.count as f64;
    let mean_difference = summary_a.mean - summary_b.mean;

    let (standard_error, df) = match assumption {
        VarianceAssumption::Pooled => {
            let df = n_a + n_b - 2.0;
            let pooled = ((n_a - 1.0) * summary_a.variance + (n_b - 1.0) * summary_b.variance) / df;
            ((pooled * (1.0 / n_a + 1.0 / n_b)).sqrt(), df)
        }
        VarianceAssumption::Welch => {
            let se_a = summary_a.squared_standard_error();
            let se_b = summary_b.squared_standard_error();
            let df = (se_a + se_b).powi(2)
                / (se_a.powi(2) / (n_a - 1.0) + se_b.powi(2) / (n_b - 1.0));
            ((se_a + se_b).sqrt(), df)
        }
    };

    let (statistic, p_value) = if df.is_finite() && df > 0.0 {
        let t = mean_difference / standard_error;
        (t, two_sided_t(t, df)?)
    } else {
        (f64::NAN, f64::NAN)
    };

    let effect_size = cohens_d(&summary_a, &summary_b);
    Ok(MeanTestResult {
        kind: TestKind::TTest,
        variance_assumption: Some(assumption),
        statistic,
        p_value,
        degrees_of_freedom: Some(df),
        summary_a,
        summary_b,
        mean_difference,
        effect_size,
        effect_interpretation: interpret_effect_size(effect_size),
    })
}

/// Two-sample z-test: `(mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b)`
///
/// The p-value is `2 * (1 - Phi(|z|))`. A group with a single observation has
/// no sample variance, which makes the statistic NaN.
pub fn z_test(a: &[f64], b: &[f64]) -> Result<MeanTestResult, MeanTestError> {
    let (summary_a, summary_b) = validate(a, b)?;
    let mean_difference = summary_a.mean - summary_b.mean;

    let (statistic, p_value) = if summary_a.count < 2 || summary_b.count < 2 {
        (f64::NAN, f64::NAN)
    } else {
        let standard_error =
            (summary_a.squared_standard_error() + summary_b.squared_standard_error()).sqrt();
        let z = mean_difference / standard_error;
        (z, two_sided_normal(z)?)
    };

    let effect_size = cohens_d(&summary_a, &summary_b);
    Ok(MeanTestResult {
        kind: TestKind::ZTest,
        variance_assumption: None,
        statistic,
        p_value,
        degrees_of_freedom: None,
        summary_a,
        summary_b,
        mean_difference,
        effect_size,
        effect_interpretation: interpret_effect_size(effect_size),
    })
}

fn two_sided_t(t: f64, df: f64) -> Result<f64, MeanTestError> {
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| MeanTestError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

fn two_sided_normal(z: f64) -> Result<f64, MeanTestError> {
    if z.is_nan() {
        return Ok(f64::NAN);
    }
    if z.is_infinite() {
        return Ok(0.0);
    }
    let dist = Normal::new(0.0, 1.0).map_err(|e| MeanTestError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(z.abs())).clamp(0.0, 1.0))
}

/// Cohen's d with the pooled standard deviation, 0.0 when it is zero
pub fn cohens_d(a: &SampleSummary, b: &SampleSummary) -> f64 {
    let n1 = a.count as f64;
    let n2 = b.count as f64;
    if n1 + n2 <= 2.0 {
        return 0.0;
    }
    let pooled_std = (((n1 - 1.0) * a.variance + (n2 - 1.0) * b.variance) / (n1 + n2 - 2.0)).sqrt();

    if pooled_std > 0.0 {
        (a.mean - b.mean) / pooled_std
    } else {
        0.0
    }
}

/// Interpret effect size magnitude using Cohen's conventions
pub fn interpret_effect_size(d: f64) -> EffectInterpretation {
    let abs_d = d.abs();
    if abs_d < 0.2 {
        EffectInterpretation::Negligible
    } else if abs_d < 0.5 {
        EffectInterpretation::Small
    } else if abs_d < 0.8 {
        EffectInterpretation::Medium
    } else {
        EffectInterpretation::Large
    }
}
