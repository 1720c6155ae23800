//! Error types for dataset construction and segment testing

use crate::schema::ColumnKind;
use riskseg_stats::{ContingencyError, MeanTestError};
use thiserror::Error;

/// Errors raised while building or validating a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Column '{column}' is defined more than once in the schema")]
    DuplicateColumn { column: String },

    #[error("Row {row}: column '{column}' expects a {expected} value")]
    TypeMismatch {
        row: usize,
        column: String,
        expected: ColumnKind,
    },

    #[error("Row {row}: column '{column}' holds an unsupported value (only numbers, strings and null are allowed)")]
    UnsupportedValue { row: usize, column: String },

    #[error("Row {row} has {got} cells, schema has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by an individual hypothesis test
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' has {found} distinct value(s); at least 2 are required")]
    InsufficientCategories { column: String, found: usize },

    #[error("Group '{group}' has no observations")]
    EmptyGroup { group: String },

    #[error("Column '{column}' is not numeric")]
    NotNumeric { column: String },

    #[error(transparent)]
    Contingency(#[from] ContingencyError),

    #[error(transparent)]
    MeanTest(#[from] MeanTestError),
}

/// Result alias for hypothesis tests
pub type TestOutcome<T> = Result<T, TestError>;
