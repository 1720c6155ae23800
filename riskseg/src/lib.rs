#![warn(missing_docs)]
//! # riskseg
//!
//! Segment hypothesis testing for insurance risk and margin analysis.
//!
//! riskseg splits a policy dataset into segments and asks whether a metric
//! differs between them:
//! - **Segments**: borrowed views filtered by value or exclusion; the dataset is never mutated
//! - **Chi-squared**: association between a categorical feature and a metric, with Yates' correction on 2x2 tables
//! - **Mean differences**: t-test for small groups, z-test once both groups exceed 30 observations
//! - **Battery**: four fixed scenarios (provinces, postal codes, margins, gender) run in parallel
//! - **Reports**: JSON or terminal output, plus a missing-value summary
//!
//! ## Quick Start
//!
//! ```ignore
//! use riskseg::prelude::*;
//!
//! let dataset = Dataset::from_json_str(Schema::insurance(), &json)?;
//! let tester = SegmentTester::new(&dataset);
//! let battery = tester.run_battery(&BatteryConfig::default());
//! for outcome in &battery.outcomes {
//!     println!("{}\n{}", outcome.scenario, outcome.text);
//! }
//! ```

// Re-export core types
pub use riskseg_core::{
    BatteryConfig, BatteryReport, CategoryKey, ColumnDef, ColumnKind, Dataset, DatasetError,
    MissingColumn, OutcomeStatus, Scenario, ScenarioOutcome, Schema, Segment, SegmentTester,
    TestError, TestOutcome, TestResult, TesterConfig, Value, columns,
};

// Re-export stats
pub use riskseg_stats::{
    ContingencyTable, DEFAULT_ALPHA, EffectInterpretation, Interpretation, LARGE_SAMPLE_THRESHOLD,
    SampleSummary, TestKind, VarianceAssumption, chi_squared_independence, choose_test,
    compute_summary, interpret, t_test, z_test,
};

// Re-export reporting
pub use riskseg_report::{
    OutputFormat, Report, build_report, format_human_output, generate_json_report,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BatteryConfig, Dataset, Interpretation, Schema, SegmentTester, TestKind, Value, columns,
    };
}

pub use riskseg_cli::{RisksegConfig, analyze_dataset};

/// Run the riskseg CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     riskseg::run()
/// }
/// ```
pub use riskseg_cli::run;
