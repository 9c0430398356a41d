//! Row-oriented dataset produced by ingestion and replaced wholesale by cleaning.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::AnalysisError;

/// Number of leading non-missing values inspected when inferring a column type.
pub const TYPE_SAMPLE_SIZE: usize = 10;

/// Strings (besides null and empty) counted as missing in a dataset summary.
const MISSING_MARKERS: &[&str] = &["NA", "N/A"];

/// A single cell. Numeric-looking text becomes `Number` at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Dynamic typing for a raw CSV cell: absent -> Null, numeric-looking -> Number, else Text.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            None => Value::Null,
            Some(s) => match parse_number(s) {
                Some(n) => Value::Number(n),
                None => Value::Text(s.to_string()),
            },
        }
    }

    /// Null or empty text.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Number(_) => false,
        }
    }

    /// Numeric interpretation of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Number(_) | Value::Null => None,
            Value::Text(s) => parse_number(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parses a trimmed, non-empty string as a finite float. Spellings such as `inf`,
/// `infinity` and `NaN`, and literals that overflow, stay text.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Date,
    Unknown,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Categorical => write!(f, "categorical"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Unknown => write!(f, "unknown"),
        }
    }
}

fn date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d{1,4}[-/]\d{1,2}[-/]\d{1,4}$").ok())
        .as_ref()
}

/// True when the text looks like a calendar date or timestamp.
pub fn looks_like_date(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    if date_pattern().is_some_and(|re| re.is_match(s)) {
        return true;
    }
    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%B %d, %Y").is_ok()
        || NaiveDate::parse_from_str(s, "%b %d, %Y").is_ok()
}

/// Infers a column type from its first `TYPE_SAMPLE_SIZE` non-missing values.
///
/// All numeric -> `Numeric`; all date-like -> `Date`; otherwise `Categorical`.
/// A column with no present values is `Unknown`.
pub fn detect_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a Value>,
{
    let sample: Vec<&Value> = values
        .into_iter()
        .filter(|v| !v.is_missing())
        .take(TYPE_SAMPLE_SIZE)
        .collect();

    if sample.is_empty() {
        return ColumnType::Unknown;
    }
    if sample.iter().all(|v| v.as_f64().is_some()) {
        return ColumnType::Numeric;
    }
    let all_dates = sample.iter().all(|v| match v {
        Value::Text(s) => looks_like_date(s),
        _ => false,
    });
    if all_dates {
        ColumnType::Date
    } else {
        ColumnType::Categorical
    }
}

/// Rectangular row set. Every row holds exactly one value per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Builds a dataset, padding short rows with `Null` and truncating long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` in column `column`.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Row as a column-name keyed map.
    pub fn row_map(&self, row: usize) -> Option<BTreeMap<&str, &Value>> {
        let r = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(r.iter())
                .collect(),
        )
    }

    /// All values of one column in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Inferred type of every column, in column order. Recomputed on each call.
    pub fn column_types(&self) -> Vec<(String, ColumnType)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let ty = detect_column_type(self.rows.iter().map(|r| &r[idx]));
                (name.clone(), ty)
            })
            .collect()
    }

    /// Names of the columns currently inferred as numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_types()
            .into_iter()
            .filter(|(_, ty)| *ty == ColumnType::Numeric)
            .map(|(name, _)| name)
            .collect()
    }

    /// Extracts aligned (x, y) samples for two columns.
    ///
    /// Rows where either cell has no numeric interpretation are skipped.
    pub fn numeric_pairs(
        &self,
        x_column: &str,
        y_column: &str,
    ) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
        let xi = self.column_index(x_column).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("unknown column '{}'", x_column))
        })?;
        let yi = self.column_index(y_column).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("unknown column '{}'", y_column))
        })?;

        let mut xs = Vec::with_capacity(self.rows.len());
        let mut ys = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if let (Some(x), Some(y)) = (row[xi].as_f64(), row[yi].as_f64()) {
                if x.is_finite() && y.is_finite() {
                    xs.push(x);
                    ys.push(y);
                }
            }
        }
        Ok((xs, ys))
    }

    /// New dataset with the same columns and the given rows.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self::new(self.columns.clone(), rows)
    }
}

/// Shape, missing-cell count, and inferred column types of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_values: usize,
    pub column_types: Vec<(String, ColumnType)>,
}

/// Summarises a dataset. "NA" and "N/A" count as missing alongside null and empty text.
pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let missing_values = dataset
        .rows()
        .iter()
        .flatten()
        .filter(|v| match v {
            Value::Text(s) => s.is_empty() || MISSING_MARKERS.contains(&s.as_str()),
            other => other.is_missing(),
        })
        .count();

    DatasetSummary {
        row_count: dataset.len(),
        column_count: dataset.column_count(),
        missing_values,
        column_types: dataset.column_types(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn from_cell_dynamic_typing() {
        assert_eq!(Value::from_cell(None), Value::Null);
        assert_eq!(Value::from_cell(Some("12.5")), Value::Number(12.5));
        assert_eq!(Value::from_cell(Some(" 7 ")), Value::Number(7.0));
        assert_eq!(Value::from_cell(Some("1e3")), Value::Number(1000.0));
        assert_eq!(Value::from_cell(Some("abc")), text("abc"));
        assert_eq!(Value::from_cell(Some("NaN")), text("NaN"));
        assert_eq!(Value::from_cell(Some("")), text(""));
    }

    #[test]
    fn new_pads_and_truncates_rows() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Value::Number(1.0)],
                vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
            ],
        );
        assert_eq!(ds.rows()[0], vec![Value::Number(1.0), Value::Null]);
        assert_eq!(ds.rows()[1].len(), 2);
    }

    #[test]
    fn detect_types() {
        let nums = [Value::Number(1.0), text("2"), Value::Null];
        assert_eq!(detect_column_type(nums.iter()), ColumnType::Numeric);

        let dates = [text("2024-01-05"), text("1/2/2023")];
        assert_eq!(detect_column_type(dates.iter()), ColumnType::Date);

        let mixed = [text("red"), Value::Number(1.0)];
        assert_eq!(detect_column_type(mixed.iter()), ColumnType::Categorical);

        let empty = [Value::Null, text("")];
        assert_eq!(detect_column_type(empty.iter()), ColumnType::Unknown);
    }

    #[test]
    fn detect_only_samples_first_values() {
        let mut values: Vec<Value> = (0..TYPE_SAMPLE_SIZE).map(|i| Value::Number(i as f64)).collect();
        values.push(text("late string"));
        assert_eq!(detect_column_type(values.iter()), ColumnType::Numeric);
    }

    #[test]
    fn numeric_pairs_skips_unparseable_rows() {
        let ds = Dataset::new(
            vec!["x".into(), "y".into()],
            vec![
                vec![Value::Number(1.0), Value::Number(2.0)],
                vec![text("bad"), Value::Number(3.0)],
                vec![Value::Number(3.0), Value::Null],
                vec![text("4"), Value::Number(8.0)],
            ],
        );
        let (xs, ys) = ds.numeric_pairs("x", "y").unwrap();
        assert_eq!(xs, vec![1.0, 4.0]);
        assert_eq!(ys, vec![2.0, 8.0]);
    }

    #[test]
    fn numeric_pairs_unknown_column() {
        let ds = Dataset::new(vec!["x".into()], vec![]);
        let err = ds.numeric_pairs("x", "nope").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn summary_counts_missing_markers() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Value::Number(1.0), text("NA")],
                vec![Value::Null, text("N/A")],
                vec![text(""), text("x")],
            ],
        );
        let summary = summarize(&ds);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.column_count, 2);
        assert_eq!(summary.missing_values, 4);
        assert_eq!(summary.column_types[0], ("a".to_string(), ColumnType::Numeric));
    }

    #[test]
    fn row_map_keys_by_column() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Number(1.0), text("x")]],
        );
        let row = ds.row_map(0).unwrap();
        assert_eq!(row.get("b"), Some(&&text("x")));
        assert!(ds.row_map(1).is_none());
    }
}
