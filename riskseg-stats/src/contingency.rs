//! Chi-Squared Test of Independence
//!
//! Works on a cross-tabulation of counts. Degrees of freedom follow the
//! standard `(rows - 1) * (cols - 1)` rule. For a 2x2 table the Yates
//! continuity correction can be applied: every observed count is moved toward
//! its expected count by `min(0.5, |O - E|)` before the statistic is summed.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use thiserror::Error;

/// Cross-tabulation of co-occurrence counts between two categorical columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Labels of the row categories (the segmenting feature)
    pub row_labels: Vec<String>,
    /// Labels of the column categories (the outcome metric)
    pub column_labels: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a labelled table, checking that every row has one count per column
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self, ContingencyError> {
        if counts.len() != row_labels.len() {
            return Err(ContingencyError::RowLabelMismatch {
                labels: row_labels.len(),
                rows: counts.len(),
            });
        }
        if let Some((row, got)) = counts
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|(_, len)| *len != column_labels.len())
        {
            return Err(ContingencyError::Ragged {
                row,
                expected: column_labels.len(),
                got,
            });
        }

        Ok(Self {
            row_labels,
            column_labels,
            counts,
        })
    }

    /// Build a table with positional labels ("0", "1", ...)
    pub fn from_counts(counts: Vec<Vec<u64>>) -> Result<Self, ContingencyError> {
        let rows = counts.len();
        let columns = counts.first().map(Vec::len).unwrap_or(0);
        Self::new(
            (0..rows).map(|i| i.to_string()).collect(),
            (0..columns).map(|j| j.to_string()).collect(),
            counts,
        )
    }

    /// Number of row categories
    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of column categories
    pub fn columns(&self) -> usize {
        self.column_labels.len()
    }

    /// Total number of counted observations
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_sums(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|r| r.iter().sum::<u64>() as f64)
            .collect()
    }

    fn column_sums(&self) -> Vec<f64> {
        (0..self.columns())
            .map(|j| self.counts.iter().map(|r| r[j]).sum::<u64>() as f64)
            .collect()
    }
}

/// Outcome of a chi-squared independence test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquaredResult {
    /// Chi-squared statistic
    pub statistic: f64,
    /// Upper-tail probability of the statistic
    pub p_value: f64,
    /// `(rows - 1) * (cols - 1)`
    pub degrees_of_freedom: usize,
    /// Expected frequencies under independence, same shape as the table
    pub expected: Vec<Vec<f64>>,
    /// Whether the Yates continuity correction was applied
    pub yates_corrected: bool,
}

/// Errors from contingency table construction and testing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContingencyError {
    #[error("{labels} row labels for {rows} rows of counts")]
    RowLabelMismatch { labels: usize, rows: usize },

    #[error("Row {row} has {got} counts, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Chi-squared needs at least a 2x2 table, got {rows}x{columns}")]
    InsufficientCategories { rows: usize, columns: usize },

    #[error("Contingency table has a zero row or column total")]
    ZeroMarginal,

    #[error("Chi-squared distribution error: {0}")]
    Distribution(String),
}

/// Chi-squared test for independence between the table's two dimensions
///
/// `yates` only has an effect when the table has one degree of freedom.
pub fn chi_squared_independence(
    table: &ContingencyTable,
    yates: bool,
) -> Result<ChiSquaredResult, ContingencyError> {
    let rows = table.rows();
    let columns = table.columns();
    if rows < 2 || columns < 2 {
        return Err(ContingencyError::InsufficientCategories { rows, columns });
    }

    let row_sums = table.row_sums();
    let column_sums = table.column_sums();
    if row_sums.iter().chain(&column_sums).any(|&s| s == 0.0) {
        return Err(ContingencyError::ZeroMarginal);
    }
    let total = table.total() as f64;

    let degrees_of_freedom = (rows - 1) * (columns - 1);
    let yates_corrected = yates && degrees_of_freedom == 1;

    let expected: Vec<Vec<f64>> = row_sums
        .iter()
        .map(|r| column_sums.iter().map(|c| r * c / total).collect())
        .collect();

    let mut statistic = 0.0;
    for (observed_row, expected_row) in table.counts.iter().zip(&expected) {
        for (&o, &e) in observed_row.iter().zip(expected_row) {
            let mut o = o as f64;
            if yates_corrected {
                let diff = e - o;
                o += diff.abs().min(0.5) * diff.signum();
            }
            statistic += (o - e).powi(2) / e;
        }
    }

    let dist = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| ContingencyError::Distribution(e.to_string()))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);

    Ok(ChiSquaredResult {
        statistic,
        p_value,
        degrees_of_freedom,
        expected,
        yates_corrected,
    })
}
