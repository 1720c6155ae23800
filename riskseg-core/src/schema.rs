//! Dataset Schema
//!
//! Columns are declared once, with their kind, and every row is checked
//! against the declaration when the dataset is built.

use crate::error::DatasetError;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Column names of the insurance dataset
pub mod columns {
    /// Province of the insured vehicle
    pub const PROVINCE: &str = "Province";
    /// Postal code of the insured vehicle
    pub const POSTAL_CODE: &str = "PostalCode";
    /// Gender of the policy holder
    pub const GENDER: &str = "Gender";
    /// Total premium charged
    pub const TOTAL_PREMIUM: &str = "TotalPremium";
    /// Total claims paid
    pub const TOTAL_CLAIMS: &str = "TotalClaims";
}

/// Value type accepted by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Numbers or missing
    Numeric,
    /// Numbers, text or missing
    Categorical,
}

impl ColumnKind {
    /// Whether a cell may be stored in a column of this kind
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ColumnKind::Numeric => !matches!(value, Value::Text(_)),
            ColumnKind::Categorical => true,
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Declaration of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name as it appears in input records
    pub name: String,
    /// Accepted value type
    pub kind: ColumnKind,
}

impl ColumnDef {
    /// Numeric column
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    /// Categorical column
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
        }
    }
}

/// Ordered set of column declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Build a schema, rejecting duplicate column names
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, DatasetError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DatasetError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// The fixed schema used by the test battery
    pub fn insurance() -> Self {
        Self {
            columns: vec![
                ColumnDef::categorical(columns::PROVINCE),
                ColumnDef::categorical(columns::POSTAL_CODE),
                ColumnDef::categorical(columns::GENDER),
                ColumnDef::numeric(columns::TOTAL_PREMIUM),
                ColumnDef::numeric(columns::TOTAL_CLAIMS),
            ],
        }
    }

    /// Add a column unless one with the same name is already declared
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        if self.index_of(&column.name).is_none() {
            self.columns.push(column);
        }
        self
    }

    /// Position of a column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column declaration by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All declarations in order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
