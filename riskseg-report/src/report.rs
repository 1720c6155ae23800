//! Report Data Structures

use chrono::{DateTime, Utc};
use riskseg_core::{BatteryReport, Dataset, MissingColumn, OutcomeStatus, Scenario};
use riskseg_stats::{Interpretation, TestKind};
use serde::{Deserialize, Serialize};

/// Version of the JSON layout below
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per scenario, in battery order
    pub scenarios: Vec<ScenarioEntry>,
    /// Columns with missing values, most missing first
    pub missing: Vec<MissingColumn>,
    /// Decision counts
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Layout version, see [`REPORT_SCHEMA_VERSION`]
    pub schema_version: u32,
    /// riskseg version that produced the report
    pub version: String,
    /// When the report was built
    pub timestamp: DateTime<Utc>,
    /// Rows in the analysed dataset
    pub rows: usize,
    /// Significance threshold used for every decision
    pub alpha: f64,
}

/// One battery scenario in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEntry {
    /// Scenario heading
    pub title: String,
    /// Which battery scenario this is
    pub scenario: Scenario,
    /// Whether the test ran, was skipped or could not be performed
    pub status: OutcomeStatus,
    /// Test that ran, if any
    pub test: Option<TestKind>,
    /// Test statistic (chi2, t or z)
    pub statistic: Option<f64>,
    /// Two-sided p-value
    pub p_value: Option<f64>,
    /// Degrees of freedom, absent for z-tests
    pub degrees_of_freedom: Option<f64>,
    /// Cohen's d, mean difference tests only
    pub effect_size: Option<f64>,
    /// Decision at the report's alpha
    pub interpretation: Option<Interpretation>,
    /// Formatted result or reason the test could not run
    pub text: String,
}

/// Decision counts across all scenarios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Scenarios in the report
    pub total: usize,
    /// Completed tests that rejected the null hypothesis
    pub rejected: usize,
    /// Completed tests that failed to reject
    pub not_rejected: usize,
    /// Tests skipped on a constant metric
    pub skipped: usize,
    /// Tests that could not be performed
    pub unavailable: usize,
}

impl ReportSummary {
    fn tally(entries: &[ScenarioEntry]) -> Self {
        let mut summary = ReportSummary {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match (entry.status, entry.interpretation) {
                (OutcomeStatus::Unavailable, _) => summary.unavailable += 1,
                (OutcomeStatus::Skipped, _) => summary.skipped += 1,
                (OutcomeStatus::Completed, Some(Interpretation::Reject)) => summary.rejected += 1,
                (OutcomeStatus::Completed, _) => summary.not_rejected += 1,
            }
        }
        summary
    }
}

/// Assemble a report from a finished battery run
pub fn build_report(battery: &BatteryReport, dataset: &Dataset, alpha: f64) -> Report {
    let scenarios: Vec<ScenarioEntry> = battery
        .outcomes
        .iter()
        .map(|outcome| {
            let result = outcome.result.as_ref();
            ScenarioEntry {
                title: outcome.scenario.title().to_string(),
                scenario: outcome.scenario,
                status: outcome.status,
                test: result.map(|r| r.kind),
                statistic: result.and_then(|r| r.statistic),
                p_value: result.and_then(|r| r.p_value),
                degrees_of_freedom: result.and_then(|r| r.degrees_of_freedom),
                effect_size: result.and_then(|r| r.effect_size),
                interpretation: result.map(|r| r.interpretation),
                text: outcome.text.clone(),
            }
        })
        .collect();

    Report {
        meta: ReportMeta {
            schema_version: REPORT_SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            rows: dataset.len(),
            alpha,
        },
        summary: ReportSummary::tally(&scenarios),
        missing: dataset.missing_summary(),
        scenarios,
    }
}
