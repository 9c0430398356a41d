//! CSV ingestion: polars reads every column as text, then each cell is typed on its own.

use color_eyre::Result;
use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use crate::dataset::{Dataset, Value};
use crate::error::{parse_error_from_polars, AnalysisError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reader settings for CSV ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl IngestOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Parses CSV text with a header row using default options.
pub fn parse_csv(text: &str) -> Result<Dataset, AnalysisError> {
    parse_csv_bytes(text.as_bytes(), &IngestOptions::default())
}

/// Parses raw CSV bytes with a header row.
///
/// Header order is preserved. Rows shorter than the header are padded with null and
/// longer rows are truncated. Records whose cells are all blank are skipped; quoted
/// content is kept as read. Fails when the header is empty, there are no data rows,
/// or the reader reports a structural error.
pub fn parse_csv_bytes(bytes: &[u8], options: &IngestOptions) -> Result<Dataset, AnalysisError> {
    let cleaned = skip_leading_blank_lines(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes));

    let header = cleaned.split(|b| *b == b'\n').next().unwrap_or(&[]);
    if header_is_empty(header, options.delimiter) {
        return Err(AnalysisError::Parse(
            "the file does not contain column headers".to_string(),
        ));
    }

    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    // Zero-length inference reads every column as String; typing happens per cell below.
    read_options.infer_schema_length = Some(0);
    read_options = read_options.map_parse_options(|opts| {
        opts.with_separator(options.delimiter)
            .with_truncate_ragged_lines(true)
    });

    let df = CsvReader::new(Cursor::new(cleaned.to_vec()))
        .with_options(read_options)
        .finish()
        .map_err(|e| parse_error_from_polars(&e))?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut cells: Vec<Vec<Option<&str>>> = vec![Vec::with_capacity(columns.len()); df.height()];
    for column in df.get_columns() {
        let text = column.str().map_err(|e| parse_error_from_polars(&e))?;
        for (row, cell) in cells.iter_mut().zip(text.iter()) {
            row.push(cell);
        }
    }

    let rows: Vec<Vec<Value>> = cells
        .into_iter()
        .filter(|row| !is_blank_record(row))
        .map(|row| row.into_iter().map(Value::from_cell).collect())
        .collect();

    if rows.is_empty() {
        return Err(AnalysisError::Parse(
            "the file does not contain any data".to_string(),
        ));
    }

    tracing::debug!(
        rows = rows.len(),
        columns = columns.len(),
        "parsed CSV input"
    );

    Ok(Dataset::new(columns, rows))
}

/// Skips whitespace-only lines before the header row.
fn skip_leading_blank_lines(bytes: &[u8]) -> &[u8] {
    let mut rest = bytes;
    while let Some(end) = rest.iter().position(|b| *b == b'\n') {
        if !rest[..end].iter().all(|b| b.is_ascii_whitespace()) {
            return rest;
        }
        rest = &rest[end + 1..];
    }
    if rest.iter().all(|b| b.is_ascii_whitespace()) {
        &[]
    } else {
        rest
    }
}

/// An empty or whitespace-only line read back as a record.
fn is_blank_record(row: &[Option<&str>]) -> bool {
    row.iter()
        .all(|cell| cell.map_or(true, |s| s.trim().is_empty()))
}

/// Writes the dataset as CSV with a header row. Missing cells are written empty.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W, options: &IngestOptions) -> Result<()> {
    let columns: Vec<Column> = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Option<String>> = dataset
                .rows()
                .iter()
                .map(|row| match &row[idx] {
                    Value::Null => None,
                    value => Some(value.to_string()),
                })
                .collect();
            Series::new(name.as_str().into(), values).into()
        })
        .collect();
    let mut df = DataFrame::new_with_height(dataset.len(), columns)?;

    CsvWriter::new(writer)
        .with_separator(options.delimiter)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Writes the dataset to a CSV file at `path`.
pub fn export_csv(dataset: &Dataset, path: &Path, options: &IngestOptions) -> Result<()> {
    let file = File::create(path)?;
    write_csv(dataset, file, options)?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "exported CSV");
    Ok(())
}

fn header_is_empty(header: &[u8], delimiter: u8) -> bool {
    header.split(|b| *b == delimiter).all(|field| {
        field
            .iter()
            .all(|b| b.is_ascii_whitespace() || *b == b'"')
    })
}
