//! Validated In-Memory Dataset
//!
//! Rows are stored in schema column order. A record key the schema does not
//! declare is ignored; a declared column absent from a record is missing.
//! The dataset is never mutated after construction.

use crate::error::{DatasetError, TestError};
use crate::schema::Schema;
use crate::segment::Segment;
use crate::value::{CategoryKey, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// Immutable table of schema-validated rows
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

/// Missing-value statistics of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumn {
    /// Column name
    pub column: String,
    /// Number of missing cells
    pub missing_count: usize,
    /// Missing cells as a percentage of all rows
    pub percentage: f64,
}

impl Dataset {
    /// Build from positional rows laid out in schema order
    ///
    /// `Value::Number(NaN)` cells are stored as missing.
    pub fn new(schema: Schema, mut rows: Vec<Vec<Value>>) -> Result<Self, DatasetError> {
        for (row_idx, row) in rows.iter_mut().enumerate() {
            if row.len() != schema.len() {
                return Err(DatasetError::RowWidth {
                    row: row_idx,
                    expected: schema.len(),
                    got: row.len(),
                });
            }
            for (value, column) in row.iter_mut().zip(schema.columns()) {
                if matches!(value, Value::Number(n) if n.is_nan()) {
                    *value = Value::Missing;
                }
                if !column.kind.accepts(value) {
                    return Err(DatasetError::TypeMismatch {
                        row: row_idx,
                        column: column.name.clone(),
                        expected: column.kind,
                    });
                }
            }
        }
        Ok(Self { schema, rows })
    }

    /// Build from keyed records
    pub fn from_records<R, K>(
        schema: Schema,
        records: impl IntoIterator<Item = R>,
    ) -> Result<Self, DatasetError>
    where
        R: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Value::Missing; schema.len()];
                for (key, value) in record {
                    if let Some(idx) = schema.index_of(key.as_ref()) {
                        row[idx] = value;
                    }
                }
                row
            })
            .collect();
        Self::new(schema, rows)
    }

    /// Parse a JSON array of objects keyed by column name
    pub fn from_json_str(schema: Schema, json: &str) -> Result<Self, DatasetError> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Self::from_json_records(schema, records)
    }

    /// Read a JSON array of objects keyed by column name
    pub fn from_json_reader(schema: Schema, reader: impl Read) -> Result<Self, DatasetError> {
        let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
        Self::from_json_records(schema, records)
    }

    fn from_json_records(
        schema: Schema,
        records: Vec<serde_json::Value>,
    ) -> Result<Self, DatasetError> {
        let mut rows = Vec::with_capacity(records.len());
        for (row_idx, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or(DatasetError::NotAnObject { row: row_idx })?;
            let mut row = vec![Value::Missing; schema.len()];
            for (idx, column) in schema.columns().iter().enumerate() {
                if let Some(raw) = object.get(&column.name) {
                    row[idx] = Value::from_json(raw).ok_or_else(|| {
                        DatasetError::UnsupportedValue {
                            row: row_idx,
                            column: column.name.clone(),
                        }
                    })?;
                }
            }
            rows.push(row);
        }
        Self::new(schema, rows)
    }

    /// Schema the rows were validated against
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `ColumnNotFound`
    pub fn column_index(&self, column: &str) -> Result<usize, TestError> {
        self.schema
            .index_of(column)
            .ok_or_else(|| TestError::ColumnNotFound {
                column: column.to_string(),
            })
    }

    /// Cell at `row`, `column_idx`
    pub fn value(&self, row: usize, column_idx: usize) -> &Value {
        &self.rows[row][column_idx]
    }

    /// A view over every row
    pub fn all_rows(&self) -> Segment<'_> {
        Segment::all(self)
    }

    /// Distinct non-missing values of a column, in order of first appearance
    pub fn distinct_values(&self, column: &str) -> Result<Vec<CategoryKey>, TestError> {
        let idx = self.column_index(column)?;
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row[idx].category_key())
            .filter(|key| seen.insert(key.clone()))
            .collect())
    }

    /// Columns with at least one missing cell, highest percentage first
    pub fn missing_summary(&self) -> Vec<MissingColumn> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        let total = self.rows.len() as f64;
        let mut summary: Vec<MissingColumn> = self
            .schema
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(idx, column)| {
                let missing_count = self.rows.iter().filter(|r| r[idx].is_missing()).count();
                (missing_count > 0).then(|| MissingColumn {
                    column: column.name.clone(),
                    missing_count,
                    percentage: missing_count as f64 / total * 100.0,
                })
            })
            .collect();

        summary.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summary
    }
}
