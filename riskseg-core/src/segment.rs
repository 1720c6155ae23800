//! Segments
//!
//! A segment is a borrowed view of dataset rows selected by equality or
//! exclusion on one column. Filtering produces a new view; the dataset is
//! never touched.

use crate::dataset::Dataset;
use crate::error::TestError;
use crate::schema::ColumnKind;
use crate::value::{CategoryKey, Value};
use riskseg_stats::{SampleSummary, compute_summary};
use std::collections::HashSet;

/// Filtered view of dataset rows
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
    label: String,
}

impl<'a> Segment<'a> {
    pub(crate) fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: (0..dataset.len()).collect(),
            label: "all rows".to_string(),
        }
    }

    /// Narrow this view
    ///
    /// Rows whose `feature` value is in `exclude_values` are removed first;
    /// then, if `value` is given, only rows equal to it are kept. Missing
    /// cells never match `value` and are never excluded.
    pub fn refine(
        &self,
        feature: &str,
        value: Option<&Value>,
        exclude_values: &[Value],
    ) -> Result<Segment<'a>, TestError> {
        let idx = self.dataset.column_index(feature)?;

        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&row| {
                let cell = self.dataset.value(row, idx);
                !exclude_values.iter().any(|x| cell.same_category(x))
            })
            .filter(|&row| value.map_or(true, |v| self.dataset.value(row, idx).same_category(v)))
            .collect();

        Ok(Segment {
            dataset: self.dataset,
            rows,
            label: self.describe(feature, value, exclude_values),
        })
    }

    fn describe(&self, feature: &str, value: Option<&Value>, exclude_values: &[Value]) -> String {
        let mut parts = Vec::new();
        if self.label != "all rows" {
            parts.push(self.label.clone());
        }
        if !exclude_values.is_empty() {
            let excluded: Vec<String> = exclude_values.iter().map(ToString::to_string).collect();
            parts.push(format!("{} not in [{}]", feature, excluded.join(", ")));
        }
        if let Some(v) = value {
            parts.push(format!("{} = {}", feature, v));
        }
        if parts.is_empty() {
            self.label.clone()
        } else {
            parts.join(", ")
        }
    }

    /// Human-readable description of the filters applied
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Dataset this view borrows from
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Row indices into the dataset, in dataset order
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    /// Number of rows in the view
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column for the rows in this view
    pub fn values(&self, column: &str) -> Result<Vec<&'a Value>, TestError> {
        let idx = self.dataset.column_index(column)?;
        let dataset = self.dataset;
        Ok(self.rows.iter().map(|&row| dataset.value(row, idx)).collect())
    }

    /// Non-missing numbers of a numeric column
    pub fn numeric_values(&self, column: &str) -> Result<Vec<f64>, TestError> {
        let idx = self.dataset.column_index(column)?;
        if self.dataset.schema().columns()[idx].kind != ColumnKind::Numeric {
            return Err(TestError::NotNumeric {
                column: column.to_string(),
            });
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|&row| self.dataset.value(row, idx).as_f64())
            .collect())
    }

    /// Distinct non-missing values of a column within this view
    pub fn distinct(&self, column: &str) -> Result<HashSet<CategoryKey>, TestError> {
        let idx = self.dataset.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|&row| self.dataset.value(row, idx).category_key())
            .collect())
    }

    /// Descriptive summary of a numeric column within this view
    pub fn summary(&self, column: &str) -> Result<SampleSummary, TestError> {
        Ok(compute_summary(&self.numeric_values(column)?))
    }
}
