//! Segment Hypothesis Tester
//!
//! Compares a metric across segments of an immutable dataset. Every method
//! takes or returns a derived view; the tester holds no mutable state, so
//! results do not depend on call order.

use crate::dataset::Dataset;
use crate::error::{TestError, TestOutcome};
use crate::segment::Segment;
use crate::value::{CategoryKey, Value};
use riskseg_stats::{
    ContingencyTable, DEFAULT_ALPHA, Interpretation, LARGE_SAMPLE_THRESHOLD, MeanTestError,
    MeanTestResult, TestKind, VarianceAssumption, chi_squared_independence,
    choose_test_with_threshold, interpret, t_test, z_test,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Tuning of the individual tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Significance threshold
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Per-group count above which the z-test is chosen
    #[serde(default = "default_large_sample_threshold")]
    pub large_sample_threshold: usize,
    /// Variance assumption of the t-test
    #[serde(default)]
    pub variance: VarianceAssumption,
    /// Apply Yates' correction to 2x2 chi-squared tables
    #[serde(default = "default_yates_correction")]
    pub yates_correction: bool,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            large_sample_threshold: default_large_sample_threshold(),
            variance: VarianceAssumption::default(),
            yates_correction: default_yates_correction(),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
fn default_large_sample_threshold() -> usize {
    LARGE_SAMPLE_THRESHOLD
}
fn default_yates_correction() -> bool {
    true
}

/// Outcome of one hypothesis test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Test family
    pub kind: TestKind,
    /// Test statistic, absent when skipped
    pub statistic: Option<f64>,
    /// p-value, absent when skipped
    pub p_value: Option<f64>,
    /// Degrees of freedom (chi-squared and t-tests)
    pub degrees_of_freedom: Option<f64>,
    /// Cohen's d for mean difference tests
    pub effect_size: Option<f64>,
    /// Decision under the tester's alpha
    pub interpretation: Interpretation,
}

impl TestResult {
    fn skipped(kind: TestKind) -> Self {
        Self {
            kind,
            statistic: None,
            p_value: None,
            degrees_of_freedom: None,
            effect_size: None,
            interpretation: Interpretation::Skipped,
        }
    }

    /// Whether the test was skipped on degenerate input
    pub fn is_skipped(&self) -> bool {
        self.p_value.is_none()
    }
}

/// Hypothesis tests over segments of one dataset
#[derive(Debug, Clone)]
pub struct SegmentTester<'a> {
    dataset: &'a Dataset,
    config: TesterConfig,
}

impl<'a> SegmentTester<'a> {
    /// Tester with the default configuration
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::with_config(dataset, TesterConfig::default())
    }

    /// Tester with an explicit configuration
    pub fn with_config(dataset: &'a Dataset, config: TesterConfig) -> Self {
        Self { dataset, config }
    }

    /// Dataset under test
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Active configuration
    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// Rows of the dataset filtered on `feature`
    ///
    /// Exclusion is applied before the equality filter. An empty result is a
    /// valid, empty segment.
    pub fn segment(
        &self,
        feature: &str,
        value: Option<&Value>,
        exclude_values: &[Value],
    ) -> TestOutcome<Segment<'a>> {
        self.dataset
            .all_rows()
            .refine(feature, value, exclude_values)
    }

    /// True iff the metric has exactly one distinct non-missing value across
    /// the whole dataset
    pub fn has_constant_metric(&self, metric: &str) -> TestOutcome<bool> {
        Ok(self.dataset.all_rows().distinct(metric)?.len() == 1)
    }

    /// True iff every segment is internally constant in the metric
    ///
    /// Stricter than [`has_constant_metric`](Self::has_constant_metric): it
    /// also catches two segments that are each constant but differ.
    pub fn has_constant_metric_in(
        &self,
        segments: &[&Segment<'_>],
        metric: &str,
    ) -> TestOutcome<bool> {
        for segment in segments {
            if segment.distinct(metric)?.len() > 1 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Cross-tabulation of non-missing `feature` x `metric` pairs
    pub fn contingency_table(&self, feature: &str, metric: &str) -> TestOutcome<ContingencyTable> {
        let feature_idx = self.dataset.column_index(feature)?;
        let metric_idx = self.dataset.column_index(metric)?;

        let mut counts: BTreeMap<(CategoryKey, CategoryKey), u64> = BTreeMap::new();
        let mut row_keys = BTreeSet::new();
        let mut column_keys = BTreeSet::new();
        for row in 0..self.dataset.len() {
            let (Some(r), Some(c)) = (
                self.dataset.value(row, feature_idx).category_key(),
                self.dataset.value(row, metric_idx).category_key(),
            ) else {
                continue;
            };
            row_keys.insert(r.clone());
            column_keys.insert(c.clone());
            *counts.entry((r, c)).or_default() += 1;
        }

        for (column, keys) in [(feature, &row_keys), (metric, &column_keys)] {
            if keys.len() < 2 {
                return Err(TestError::InsufficientCategories {
                    column: column.to_string(),
                    found: keys.len(),
                });
            }
        }

        let table: Vec<Vec<u64>> = row_keys
            .iter()
            .map(|r| {
                column_keys
                    .iter()
                    .map(|c| counts.get(&(r.clone(), c.clone())).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Ok(ContingencyTable::new(
            row_keys.iter().map(ToString::to_string).collect(),
            column_keys.iter().map(ToString::to_string).collect(),
            table,
        )?)
    }

    /// Chi-squared test of independence between `feature` and `metric`
    pub fn categorical_association_test(&self, feature: &str, metric: &str) -> TestOutcome<TestResult> {
        let table = self.contingency_table(feature, metric)?;
        let result = chi_squared_independence(&table, self.config.yates_correction)?;
        debug!(
            feature,
            metric,
            rows = table.rows(),
            columns = table.columns(),
            chi2 = result.statistic,
            p_value = result.p_value,
            "chi-squared test"
        );

        Ok(TestResult {
            kind: TestKind::ChiSquared,
            statistic: Some(result.statistic),
            p_value: Some(result.p_value),
            degrees_of_freedom: Some(result.degrees_of_freedom as f64),
            effect_size: None,
            interpretation: self.interpret(Some(result.p_value)),
        })
    }

    /// Two-sample t-test of `metric` between two segments
    ///
    /// Skipped (not failed) when the metric is constant over the whole
    /// dataset.
    pub fn mean_difference_test_small(
        &self,
        segment_a: &Segment<'_>,
        segment_b: &Segment<'_>,
        metric: &str,
    ) -> TestOutcome<TestResult> {
        let base = self.dataset.all_rows();
        self.mean_difference_test_small_within(&base, segment_a, segment_b, metric)
    }

    /// Two-sample t-test of `metric` between two segments drawn from `base`
    ///
    /// Skipped when the metric is constant over `base`, so rows filtered out
    /// of the comparison do not affect the check.
    pub fn mean_difference_test_small_within(
        &self,
        base: &Segment<'_>,
        segment_a: &Segment<'_>,
        segment_b: &Segment<'_>,
        metric: &str,
    ) -> TestOutcome<TestResult> {
        let (a, b) = self.group_values(segment_a, segment_b, metric)?;

        if base.distinct(metric)?.len() == 1 {
            warn!(metric, base = base.label(), "all values are identical, skipping t-test");
            return Ok(TestResult::skipped(TestKind::TTest));
        }

        let result = t_test(&a, &b, self.config.variance)
            .map_err(|e| self.group_error(e, segment_a, segment_b))?;
        Ok(self.mean_result(result))
    }

    /// Two-sample z-test of `metric` between two segments
    ///
    /// The large-sample threshold is the caller's responsibility.
    pub fn mean_difference_test_large(
        &self,
        segment_a: &Segment<'_>,
        segment_b: &Segment<'_>,
        metric: &str,
    ) -> TestOutcome<TestResult> {
        let (a, b) = self.group_values(segment_a, segment_b, metric)?;
        let result = z_test(&a, &b).map_err(|e| self.group_error(e, segment_a, segment_b))?;
        Ok(self.mean_result(result))
    }

    /// Mean difference test chosen by [`choose_test`](Self::choose_test) on
    /// the non-missing metric counts
    pub fn mean_difference_test(
        &self,
        segment_a: &Segment<'_>,
        segment_b: &Segment<'_>,
        metric: &str,
    ) -> TestOutcome<TestResult> {
        let n_a = segment_a.numeric_values(metric)?.len();
        let n_b = segment_b.numeric_values(metric)?.len();
        match self.choose_test(n_a, n_b) {
            TestKind::ZTest => self.mean_difference_test_large(segment_a, segment_b, metric),
            _ => self.mean_difference_test_small(segment_a, segment_b, metric),
        }
    }

    /// z-test iff both groups exceed the configured large-sample threshold
    pub fn choose_test(&self, n_a: usize, n_b: usize) -> TestKind {
        choose_test_with_threshold(n_a, n_b, self.config.large_sample_threshold)
    }

    /// Interpret a p-value under the configured alpha
    pub fn interpret(&self, p_value: Option<f64>) -> Interpretation {
        interpret(p_value, self.config.alpha)
    }

    fn group_values(
        &self,
        segment_a: &Segment<'_>,
        segment_b: &Segment<'_>,
        metric: &str,
    ) -> TestOutcome<(Vec<f64>, Vec<f64>)> {
        let a = segment_a.numeric_values(metric)?;
        let b = segment_b.numeric_values(metric)?;
        for (segment, values) in [(segment_a, &a), (segment_b, &b)] {
            if values.is_empty() {
                return Err(TestError::EmptyGroup {
                    group: segment.label().to_string(),
                });
            }
        }
        Ok((a, b))
    }

    fn group_error(&self, error: MeanTestError, a: &Segment<'_>, b: &Segment<'_>) -> TestError {
        match error {
            MeanTestError::EmptyFirst => TestError::EmptyGroup {
                group: a.label().to_string(),
            },
            MeanTestError::EmptySecond => TestError::EmptyGroup {
                group: b.label().to_string(),
            },
            other => TestError::MeanTest(other),
        }
    }

    fn mean_result(&self, result: MeanTestResult) -> TestResult {
        debug!(
            kind = %result.kind,
            n_a = result.summary_a.count,
            n_b = result.summary_b.count,
            statistic = result.statistic,
            p_value = result.p_value,
            "mean difference test"
        );
        TestResult {
            kind: result.kind,
            statistic: Some(result.statistic),
            p_value: Some(result.p_value),
            degrees_of_freedom: result.degrees_of_freedom,
            effect_size: Some(result.effect_size),
            interpretation: self.interpret(Some(result.p_value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, columns};

    /// Six policies, two per province and postal code, alternating gender
    fn sample() -> Dataset {
        let provinces = ["A", "A", "B", "B", "C", "C"];
        let postal_codes = ["123", "123", "456", "456", "789", "789"];
        let genders = ["Male", "Female", "Male", "Female", "Male", "Female"];
        let premiums = [1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 3500.0];
        let claims = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

        Dataset::from_records(
            Schema::insurance(),
            (0..6).map(|i| {
                vec![
                    (columns::PROVINCE, Value::from(provinces[i])),
                    (columns::POSTAL_CODE, Value::from(postal_codes[i])),
                    (columns::GENDER, Value::from(genders[i])),
                    (columns::TOTAL_PREMIUM, Value::from(premiums[i])),
                    (columns::TOTAL_CLAIMS, Value::from(claims[i])),
                ]
            }),
        )
        .unwrap()
    }

    fn constant_premiums() -> Dataset {
        Dataset::from_records(
            Schema::insurance(),
            ["Male", "Female", "Male"].iter().map(|g| {
                vec![
                    (columns::GENDER, Value::from(*g)),
                    (columns::TOTAL_PREMIUM, Value::from(5.0)),
                ]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_segment_by_value() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let segment = tester
            .segment(columns::PROVINCE, Some(&"A".into()), &[])
            .unwrap();
        assert_eq!(segment.row_indices(), &[0, 1]);
    }

    #[test]
    fn test_segment_by_exclusion() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let segment = tester
            .segment(columns::GENDER, None, &["Female".into()])
            .unwrap();
        assert_eq!(segment.row_indices(), &[0, 2, 4]);
    }

    #[test]
    fn test_has_constant_metric() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        assert!(!tester.has_constant_metric(columns::TOTAL_PREMIUM).unwrap());
        assert!(!tester.has_constant_metric(columns::GENDER).unwrap());

        let constant = constant_premiums();
        assert!(SegmentTester::new(&constant)
            .has_constant_metric(columns::TOTAL_PREMIUM)
            .unwrap());
    }

    #[test]
    fn test_has_constant_metric_ignores_missing() {
        let data = Dataset::from_records(
            Schema::insurance(),
            [Some(5.0), None, Some(5.0)]
                .iter()
                .map(|p| vec![(columns::TOTAL_PREMIUM, Value::from(*p))]),
        )
        .unwrap();
        assert!(SegmentTester::new(&data)
            .has_constant_metric(columns::TOTAL_PREMIUM)
            .unwrap());
    }

    #[test]
    fn test_per_segment_constant_check() {
        // Each postal code has one premium, but they differ
        let data = Dataset::from_records(
            Schema::insurance(),
            [("1", 10.0), ("1", 10.0), ("2", 20.0), ("2", 20.0)]
                .iter()
                .map(|(code, p)| {
                    vec![
                        (columns::POSTAL_CODE, Value::from(*code)),
                        (columns::TOTAL_PREMIUM, Value::from(*p)),
                    ]
                }),
        )
        .unwrap();
        let tester = SegmentTester::new(&data);
        let a = tester
            .segment(columns::POSTAL_CODE, Some(&"1".into()), &[])
            .unwrap();
        let b = tester
            .segment(columns::POSTAL_CODE, Some(&"2".into()), &[])
            .unwrap();

        assert!(!tester.has_constant_metric(columns::TOTAL_PREMIUM).unwrap());
        assert!(tester
            .has_constant_metric_in(&[&a, &b], columns::TOTAL_PREMIUM)
            .unwrap());
    }

    #[test]
    fn test_categorical_association() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let result = tester
            .categorical_association_test(columns::PROVINCE, columns::TOTAL_PREMIUM)
            .unwrap();

        assert_eq!(result.kind, TestKind::ChiSquared);
        assert_eq!(result.degrees_of_freedom, Some(10.0));
        assert!((result.statistic.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(result.interpretation, Interpretation::FailToReject);
    }

    #[test]
    fn test_contingency_table_skips_missing() {
        let data = Dataset::from_records(
            Schema::insurance(),
            [("A", Some("M")), ("A", None), ("B", Some("F")), ("B", Some("M"))]
                .iter()
                .map(|(p, g)| {
                    vec![
                        (columns::PROVINCE, Value::from(*p)),
                        (columns::GENDER, Value::from(*g)),
                    ]
                }),
        )
        .unwrap();
        let table = SegmentTester::new(&data)
            .contingency_table(columns::PROVINCE, columns::GENDER)
            .unwrap();

        assert_eq!(table.row_labels, vec!["A", "B"]);
        assert_eq!(table.column_labels, vec!["F", "M"]);
        assert_eq!(table.counts, vec![vec![0, 1], vec![1, 1]]);
    }

    #[test]
    fn test_insufficient_categories() {
        let data = constant_premiums();
        let result = SegmentTester::new(&data)
            .categorical_association_test(columns::GENDER, columns::TOTAL_PREMIUM);
        assert_eq!(
            result,
            Err(TestError::InsufficientCategories {
                column: columns::TOTAL_PREMIUM.to_string(),
                found: 1
            })
        );
    }

    #[test]
    fn test_t_test_between_genders() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let male = tester
            .segment(columns::GENDER, Some(&"Male".into()), &[])
            .unwrap();
        let female = tester
            .segment(columns::GENDER, Some(&"Female".into()), &[])
            .unwrap();

        let result = tester
            .mean_difference_test_small(&male, &female, columns::TOTAL_PREMIUM)
            .unwrap();
        assert_eq!(result.kind, TestKind::TTest);
        assert!((result.statistic.unwrap() + 0.612_372_435_695_794_5).abs() < 1e-9);
        assert_eq!(result.interpretation, Interpretation::FailToReject);
    }

    #[test]
    fn test_t_test_skipped_on_constant_metric() {
        let data = constant_premiums();
        let tester = SegmentTester::new(&data);
        let male = tester
            .segment(columns::GENDER, Some(&"Male".into()), &[])
            .unwrap();
        let female = tester
            .segment(columns::GENDER, Some(&"Female".into()), &[])
            .unwrap();

        let result = tester
            .mean_difference_test_small(&male, &female, columns::TOTAL_PREMIUM)
            .unwrap();
        assert!(result.is_skipped());
        assert_eq!(result.statistic, None);
        assert_eq!(result.interpretation, Interpretation::Skipped);
    }

    #[test]
    fn test_constant_check_uses_base_segment() {
        // Male and Female share one premium; the unspecified row differs
        let data = Dataset::from_records(
            Schema::insurance(),
            [("Male", 10.0), ("Female", 10.0), ("Male", 10.0), ("Not Specified", 1000.0)]
                .iter()
                .map(|(g, p)| {
                    vec![
                        (columns::GENDER, Value::from(*g)),
                        (columns::TOTAL_PREMIUM, Value::from(*p)),
                    ]
                }),
        )
        .unwrap();
        let tester = SegmentTester::new(&data);
        let known = tester
            .segment(columns::GENDER, None, &["Not Specified".into()])
            .unwrap();
        let male = known
            .refine(columns::GENDER, Some(&"Male".into()), &[])
            .unwrap();
        let female = known
            .refine(columns::GENDER, Some(&"Female".into()), &[])
            .unwrap();

        let within = tester
            .mean_difference_test_small_within(&known, &male, &female, columns::TOTAL_PREMIUM)
            .unwrap();
        assert!(within.is_skipped());
        assert_eq!(within.interpretation, Interpretation::Skipped);

        // over the whole dataset the metric is not constant
        let whole = tester
            .mean_difference_test_small(&male, &female, columns::TOTAL_PREMIUM)
            .unwrap();
        assert!(!whole.is_skipped());
    }

    #[test]
    fn test_empty_group_is_distinct_from_skip() {
        let data = constant_premiums();
        let tester = SegmentTester::new(&data);
        let male = tester
            .segment(columns::GENDER, Some(&"Male".into()), &[])
            .unwrap();
        let other = tester
            .segment(columns::GENDER, Some(&"Other".into()), &[])
            .unwrap();

        assert_eq!(
            tester.mean_difference_test_small(&male, &other, columns::TOTAL_PREMIUM),
            Err(TestError::EmptyGroup {
                group: "Gender = Other".to_string()
            })
        );
    }

    #[test]
    fn test_z_test_between_postal_codes() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let a = tester
            .segment(columns::POSTAL_CODE, Some(&"123".into()), &[])
            .unwrap();
        let b = tester
            .segment(columns::POSTAL_CODE, Some(&"456".into()), &[])
            .unwrap();

        let result = tester
            .mean_difference_test_large(&a, &b, columns::TOTAL_PREMIUM)
            .unwrap();
        assert_eq!(result.kind, TestKind::ZTest);
        assert!((result.statistic.unwrap() + 2.828_427_124_746_19).abs() < 1e-9);
        assert_eq!(result.interpretation, Interpretation::Reject);
    }

    #[test]
    fn test_automatic_choice_uses_t_for_small_groups() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let a = tester
            .segment(columns::POSTAL_CODE, Some(&"123".into()), &[])
            .unwrap();
        let b = tester
            .segment(columns::POSTAL_CODE, Some(&"456".into()), &[])
            .unwrap();

        let result = tester
            .mean_difference_test(&a, &b, columns::TOTAL_PREMIUM)
            .unwrap();
        assert_eq!(result.kind, TestKind::TTest);
    }

    #[test]
    fn test_choose_test_uses_configured_threshold() {
        let data = sample();
        let tester = SegmentTester::with_config(
            &data,
            TesterConfig {
                large_sample_threshold: 1,
                ..Default::default()
            },
        );
        assert_eq!(tester.choose_test(2, 2), TestKind::ZTest);
        assert_eq!(tester.choose_test(1, 2), TestKind::TTest);
    }

    #[test]
    fn test_mean_test_on_categorical_metric() {
        let data = sample();
        let tester = SegmentTester::new(&data);
        let all = tester.segment(columns::GENDER, None, &[]).unwrap();
        assert!(matches!(
            tester.mean_difference_test_small(&all, &all, columns::PROVINCE),
            Err(TestError::NotNumeric { .. })
        ));
    }
}
