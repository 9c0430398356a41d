//! Dataset-in / dataset-out cleaning: missing-value handling and IQR outlier removal.
//!
//! Both operations leave their input untouched and return a new dataset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dataset::{Dataset, Value};
use crate::error::AnalysisError;

/// Fence width, in IQRs, used when no multiplier is configured.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// How missing cells are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValueStrategy {
    /// Remove every row that has any null or empty cell.
    Drop,
    /// Per column, replace null or non-numeric cells with the column's numeric mean.
    Mean,
    /// Per column, replace null or non-numeric cells with 0.
    Zero,
}

impl MissingValueStrategy {
    pub const ALL: [Self; 3] = [Self::Drop, Self::Mean, Self::Zero];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Mean => "mean",
            Self::Zero => "zero",
        }
    }
}

impl fmt::Display for MissingValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingValueStrategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "unknown missing-value strategy '{}' (expected drop, mean, or zero)",
                    s
                ))
            })
    }
}

/// Applies a missing-value strategy.
///
/// `Mean` and `Zero` work column by column: the fill value of a column only depends on
/// that column's own parseable values. Non-numeric columns have no parseable values, so
/// every cell in them is replaced with 0.
pub fn handle_missing_values(dataset: &Dataset, strategy: MissingValueStrategy) -> Dataset {
    let cleaned = match strategy {
        MissingValueStrategy::Drop => {
            let rows = dataset
                .rows()
                .iter()
                .filter(|row| !row.iter().any(Value::is_missing))
                .cloned()
                .collect();
            dataset.with_rows(rows)
        }
        MissingValueStrategy::Mean | MissingValueStrategy::Zero => {
            let fills: Vec<f64> = (0..dataset.column_count())
                .map(|idx| {
                    if strategy == MissingValueStrategy::Zero {
                        return 0.0;
                    }
                    let values: Vec<f64> = dataset
                        .rows()
                        .iter()
                        .filter_map(|row| row[idx].as_f64())
                        .collect();
                    if values.is_empty() {
                        0.0
                    } else {
                        values.iter().sum::<f64>() / values.len() as f64
                    }
                })
                .collect();

            let rows = dataset
                .rows()
                .iter()
                .map(|row| {
                    row.iter()
                        .zip(&fills)
                        .map(|(value, fill)| {
                            if value.as_f64().is_some() {
                                value.clone()
                            } else {
                                Value::Number(*fill)
                            }
                        })
                        .collect()
                })
                .collect();
            dataset.with_rows(rows)
        }
    };

    tracing::debug!(
        strategy = %strategy,
        before = dataset.len(),
        after = cleaned.len(),
        "handled missing values"
    );
    cleaned
}

/// Quartiles and fences computed by positional indexing into the sorted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Computes IQR fences. Q1 is `sorted[floor(n/4)]` and Q3 is `sorted[floor(3n/4)]`;
/// no interpolation. NaN values are ignored. Returns `None` when nothing is left.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<IqrBounds> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n) / 4];
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        iqr,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Removes rows whose value in `column` lies outside the 1.5·IQR fences or is unparseable.
pub fn remove_outliers(dataset: &Dataset, column: &str) -> Result<Dataset, AnalysisError> {
    remove_outliers_with_multiplier(dataset, column, DEFAULT_IQR_MULTIPLIER)
}

/// As [`remove_outliers`], with a custom fence width.
pub fn remove_outliers_with_multiplier(
    dataset: &Dataset,
    column: &str,
    multiplier: f64,
) -> Result<Dataset, AnalysisError> {
    let idx = dataset
        .column_index(column)
        .ok_or_else(|| AnalysisError::InvalidInput(format!("unknown column '{}'", column)))?;

    let values: Vec<f64> = dataset
        .rows()
        .iter()
        .filter_map(|row| row[idx].as_f64())
        .collect();

    let rows = match iqr_bounds(&values, multiplier) {
        Some(bounds) => dataset
            .rows()
            .iter()
            .filter(|row| row[idx].as_f64().is_some_and(|v| bounds.contains(v)))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let cleaned = dataset.with_rows(rows);
    tracing::debug!(
        column,
        before = dataset.len(),
        after = cleaned.len(),
        "removed outliers"
    );
    Ok(cleaned)
}
