#![warn(missing_docs)]
//! riskseg Core - Datasets, Segments and the Segment Tester
//!
//! Everything between raw records and test results:
//! - Schema-validated, immutable in-memory datasets
//! - Segments: borrowed row views filtered by value or exclusion
//! - Chi-squared, t-test and z-test comparisons between segments
//! - The fixed four-scenario test battery, run in parallel

mod battery;
mod dataset;
mod error;
mod schema;
mod segment;
mod tester;
mod value;

pub use battery::{BatteryConfig, BatteryReport, OutcomeStatus, Scenario, ScenarioOutcome};
pub use dataset::{Dataset, MissingColumn};
pub use error::{DatasetError, TestError, TestOutcome};
pub use schema::{ColumnDef, ColumnKind, Schema, columns};
pub use segment::Segment;
pub use tester::{SegmentTester, TestResult, TesterConfig};
pub use value::{CategoryKey, NumberKey, Value};
