//! Test Battery
//!
//! Four fixed comparisons over the insurance dataset. Every scenario catches
//! its own test errors and reports them as text, so the battery always yields
//! four entries in a fixed order. Scenarios only read the dataset and may run
//! in parallel on the rayon pool.

use crate::error::{TestError, TestOutcome};
use crate::schema::columns;
use crate::tester::{SegmentTester, TestResult};
use crate::value::Value;
use rayon::prelude::*;
use riskseg_stats::TestKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The four comparisons run by the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Province vs. premium, chi-squared
    ProvinceRisk,
    /// Postal code vs. premium, chi-squared
    PostalCodeRisk,
    /// Margin between the first two postal codes, t-test or z-test
    PostalCodeMargin,
    /// Premium between men and women, t-test
    GenderRisk,
}

impl Scenario {
    /// All scenarios in reporting order
    pub const ALL: [Scenario; 4] = [
        Scenario::ProvinceRisk,
        Scenario::PostalCodeRisk,
        Scenario::PostalCodeMargin,
        Scenario::GenderRisk,
    ];

    /// Report heading
    pub fn title(self) -> &'static str {
        match self {
            Scenario::ProvinceRisk => "Risk Differences Across Provinces",
            Scenario::PostalCodeRisk => "Risk Differences Between Postal Codes",
            Scenario::PostalCodeMargin => "Margin Differences Between Postal Codes",
            Scenario::GenderRisk => "Risk Differences Between Women and Men",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Columns and category values used by the battery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Province column
    #[serde(default = "default_province_column")]
    pub province_column: String,
    /// Postal code column
    #[serde(default = "default_postal_code_column")]
    pub postal_code_column: String,
    /// Gender column
    #[serde(default = "default_gender_column")]
    pub gender_column: String,
    /// Metric compared by the risk scenarios
    #[serde(default = "default_metric_column")]
    pub premium_column: String,
    /// Metric compared by the margin scenario
    #[serde(default = "default_metric_column")]
    pub margin_column: String,
    /// Gender value of the first group
    #[serde(default = "default_male")]
    pub male_value: String,
    /// Gender value of the second group
    #[serde(default = "default_female")]
    pub female_value: String,
    /// Gender values removed before the gender comparison
    #[serde(default = "default_excluded_genders")]
    pub excluded_genders: Vec<String>,
    /// Run scenarios on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            province_column: default_province_column(),
            postal_code_column: default_postal_code_column(),
            gender_column: default_gender_column(),
            premium_column: default_metric_column(),
            margin_column: default_metric_column(),
            male_value: default_male(),
            female_value: default_female(),
            excluded_genders: default_excluded_genders(),
            parallel: default_parallel(),
        }
    }
}

fn default_province_column() -> String {
    columns::PROVINCE.to_string()
}
fn default_postal_code_column() -> String {
    columns::POSTAL_CODE.to_string()
}
fn default_gender_column() -> String {
    columns::GENDER.to_string()
}
fn default_metric_column() -> String {
    columns::TOTAL_PREMIUM.to_string()
}
fn default_male() -> String {
    "Male".to_string()
}
fn default_female() -> String {
    "Female".to_string()
}
fn default_excluded_genders() -> Vec<String> {
    vec!["Not Specified".to_string()]
}
fn default_parallel() -> bool {
    true
}

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// A test ran and produced a p-value
    Completed,
    /// The test was skipped on a constant metric
    Skipped,
    /// The test could not be performed
    Unavailable,
}

/// Result of one battery scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    /// Which comparison this is
    pub scenario: Scenario,
    /// How it ended
    pub status: OutcomeStatus,
    /// Formatted result or explanation
    pub text: String,
    /// Structured result when a test ran or was skipped
    pub result: Option<TestResult>,
}

impl ScenarioOutcome {
    fn completed(scenario: Scenario, text: String, result: TestResult) -> Self {
        let status = if result.is_skipped() {
            OutcomeStatus::Skipped
        } else {
            OutcomeStatus::Completed
        };
        Self {
            scenario,
            status,
            text,
            result: Some(result),
        }
    }

    fn unavailable(scenario: Scenario, text: String) -> Self {
        Self {
            scenario,
            status: OutcomeStatus::Unavailable,
            text,
            result: None,
        }
    }
}

/// All four scenario outcomes, in reporting order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReport {
    /// One entry per scenario
    pub outcomes: Vec<ScenarioOutcome>,
}

impl BatteryReport {
    /// Text of a scenario, looked up by title
    pub fn get(&self, title: &str) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| o.scenario.title() == title)
            .map(|o| o.text.as_str())
    }

    /// Outcome of a scenario
    pub fn outcome(&self, scenario: Scenario) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario == scenario)
    }

    /// Title to text mapping
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.outcomes
            .iter()
            .map(|o| (o.scenario.title().to_string(), o.text.clone()))
            .collect()
    }

    /// Number of scenarios whose null hypothesis was rejected
    pub fn rejections(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref())
            .filter(|r| r.interpretation.is_rejection())
            .count()
    }
}

enum Attempt {
    Tested(String, TestResult),
    Declined(String),
}

impl<'a> SegmentTester<'a> {
    /// Run the four scenarios
    pub fn run_battery(&self, config: &BatteryConfig) -> BatteryReport {
        let run = |scenario: &Scenario| self.run_scenario(*scenario, config);
        let outcomes = if config.parallel {
            Scenario::ALL.par_iter().map(run).collect()
        } else {
            Scenario::ALL.iter().map(run).collect()
        };
        BatteryReport { outcomes }
    }

    /// Run a single scenario, converting test errors into text
    pub fn run_scenario(&self, scenario: Scenario, config: &BatteryConfig) -> ScenarioOutcome {
        debug!(scenario = %scenario, "running scenario");
        let attempt = match scenario {
            Scenario::ProvinceRisk => {
                self.association(&config.province_column, &config.premium_column)
            }
            Scenario::PostalCodeRisk => {
                self.association(&config.postal_code_column, &config.premium_column)
            }
            Scenario::PostalCodeMargin => self.postal_code_margin(config),
            Scenario::GenderRisk => self.gender_risk(config),
        };

        match attempt {
            Ok(Attempt::Tested(text, result)) => ScenarioOutcome::completed(scenario, text, result),
            Ok(Attempt::Declined(text)) => ScenarioOutcome::unavailable(scenario, text),
            Err(error) => {
                warn!(scenario = %scenario, %error, "scenario could not be performed");
                ScenarioOutcome::unavailable(scenario, describe_failure(scenario, config, &error))
            }
        }
    }

    fn association(&self, feature: &str, metric: &str) -> TestOutcome<Attempt> {
        let result = self.categorical_association_test(feature, metric)?;
        let text = format!(
            "Chi-squared test on {} and {}: chi2 = {}, p-value = {}\n{}",
            feature,
            metric,
            fmt_option(result.statistic),
            fmt_option(result.p_value),
            result.interpretation
        );
        Ok(Attempt::Tested(text, result))
    }

    fn postal_code_margin(&self, config: &BatteryConfig) -> TestOutcome<Attempt> {
        let feature = config.postal_code_column.as_str();
        let metric = config.margin_column.as_str();

        let codes = self.dataset().distinct_values(feature)?;
        let [first, second, ..] = codes.as_slice() else {
            return Ok(Attempt::Declined(
                "Not enough unique postal codes for testing.".to_string(),
            ));
        };

        let group_a = self.segment(feature, Some(&first.to_value()), &[])?;
        let group_b = self.segment(feature, Some(&second.to_value()), &[])?;
        let result = self.mean_difference_test(&group_a, &group_b, metric)?;
        Ok(Attempt::Tested(format_mean_test(metric, &result), result))
    }

    fn gender_risk(&self, config: &BatteryConfig) -> TestOutcome<Attempt> {
        let feature = config.gender_column.as_str();
        let metric = config.premium_column.as_str();
        let excluded: Vec<Value> = config
            .excluded_genders
            .iter()
            .map(|g| Value::from(g.as_str()))
            .collect();

        let known = self.segment(feature, None, &excluded)?;
        let male = known.refine(feature, Some(&Value::from(config.male_value.as_str())), &[])?;
        let female = known.refine(feature, Some(&Value::from(config.female_value.as_str())), &[])?;

        if male.is_empty() || female.is_empty() {
            return Ok(Attempt::Declined(
                "One of the gender groups is empty. Test cannot be performed.".to_string(),
            ));
        }

        let result = self.mean_difference_test_small_within(&known, &male, &female, metric)?;
        Ok(Attempt::Tested(format_mean_test(metric, &result), result))
    }
}

fn format_mean_test(metric: &str, result: &TestResult) -> String {
    let (name, symbol) = match result.kind {
        TestKind::ZTest => ("Z-test", "Z-statistic"),
        _ => ("T-test", "T-statistic"),
    };
    format!(
        "{} on {}: {} = {}, p-value = {}\n{}",
        name,
        metric,
        symbol,
        fmt_option(result.statistic),
        fmt_option(result.p_value),
        result.interpretation
    )
}

fn fmt_option(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| format!("{:?}", v))
}

fn describe_failure(scenario: Scenario, config: &BatteryConfig, error: &TestError) -> String {
    let test = match scenario {
        Scenario::ProvinceRisk => format!(
            "Chi-squared test on {} and {}",
            config.province_column, config.premium_column
        ),
        Scenario::PostalCodeRisk => format!(
            "Chi-squared test on {} and {}",
            config.postal_code_column, config.premium_column
        ),
        Scenario::PostalCodeMargin => format!("Test on {}", config.margin_column),
        Scenario::GenderRisk => format!("T-test on {}", config.premium_column),
    };
    format!("{} cannot be performed: {}.", test, error)
}
