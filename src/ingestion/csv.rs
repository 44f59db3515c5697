//! CSV ingestion implementation.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Value};

use super::normalize::normalize;
use super::options::NormalizeOptions;

/// A parsed but untyped table: header names as read, and rows of optional cells.
///
/// `None` is the missing marker (empty cell or NA token). Every row has exactly
/// `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Header names, untrimmed.
    pub headers: Vec<String>,
    /// Row-major cells.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Split into column-major cell vectors, one per header.
    pub fn into_columns(self) -> Vec<(String, Vec<Option<String>>)> {
        let mut columns: Vec<(String, Vec<Option<String>>)> = self
            .headers
            .into_iter()
            .map(|h| (h, Vec::with_capacity(self.rows.len())))
            .collect();
        for row in self.rows {
            for (col, cell) in columns.iter_mut().zip(row) {
                col.1.push(cell);
            }
        }
        columns
    }
}

/// Build a CSV reader configured for `opts`.
pub fn reader_builder(opts: &NormalizeOptions) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Row width is validated in `read_raw_table` so short rows can be padded.
    builder.has_headers(true).delimiter(opts.delimiter).flexible(true);
    builder
}

/// Ingest a CSV file into a normalized [`DataSet`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>, opts: &NormalizeOptions) -> IngestionResult<DataSet> {
    let file = File::open(path)?;
    ingest_csv_from_reader(file, opts)
}

/// Ingest in-memory CSV bytes (e.g. an uploaded file) into a normalized [`DataSet`].
pub fn ingest_csv_from_bytes(bytes: &[u8], opts: &NormalizeOptions) -> IngestionResult<DataSet> {
    ingest_csv_from_reader(bytes, opts)
}

/// Ingest CSV data from any reader.
///
/// Rules:
///
/// - The first record is the header row.
/// - Header names are trimmed; duplicates are kept as-is.
/// - Every column goes through the datetime pass, then the numeric pass; see
///   [`super::normalize::normalize`].
pub fn ingest_csv_from_reader<R: Read>(reader: R, opts: &NormalizeOptions) -> IngestionResult<DataSet> {
    let raw = read_raw_table(reader, opts)?;
    Ok(normalize(raw, opts).dataset)
}

/// Tokenize CSV input into a [`RawTable`] without any type coercion.
///
/// - Empty header cells are named `Unnamed: {index}`.
/// - Cells that are empty or equal one of `opts.na_values` become `None`.
/// - Rows shorter than the header are padded with `None`; longer rows are an error.
/// - A quoted field still open at end of input is an error.
pub fn read_raw_table<R: Read>(reader: R, opts: &NormalizeOptions) -> IngestionResult<RawTable> {
    let mut rdr = reader_builder(opts).from_reader(QuoteTracker::new(reader, opts.delimiter));
    let header_record = rdr.headers()?.clone();
    if header_record.is_empty() {
        return Err(IngestionError::EmptyInput);
    }

    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if h.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                h.to_owned()
            }
        })
        .collect();
    let width = headers.len();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut last_row = 1;
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based for users, +1 again because the header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        if record.len() > width {
            return Err(IngestionError::RaggedRow {
                row: user_row,
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!opts.is_na(cell)).then(|| cell.to_owned()))
            .collect();
        row.resize(width, None);
        rows.push(row);
        last_row = user_row;
    }

    // The runaway field swallowed everything after it, so it sits in the last record read.
    if rdr.get_ref().in_open_quote() {
        return Err(IngestionError::UnterminatedQuote { row: last_row });
    }

    Ok(RawTable { headers, rows })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either the closing quote or the first half of `""`.
    QuoteInQuoted,
}

/// Passes bytes through unchanged while following the reader's quoting rules, so an
/// unterminated quoted field can be told apart from one that closed at end of input.
///
/// Mirrors the dialect `reader_builder` configures: `"` quotes, `""` escapes, quotes are only
/// special at the start of a field, `\r` and `\n` end records.
struct QuoteTracker<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
}

impl<R> QuoteTracker<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
        }
    }

    fn in_open_quote(&self) -> bool {
        self.state == QuoteState::Quoted
    }

    fn feed(&mut self, byte: u8) {
        let ends_field = byte == self.delimiter || byte == b'\n' || byte == b'\r';
        self.state = match (self.state, byte) {
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, _) if ends_field => QuoteState::FieldStart,
            (_, _) => QuoteState::Unquoted,
        };
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            self.feed(byte);
        }
        Ok(n)
    }
}

/// Write a dataset back out as CSV.
///
/// Floats use their round-trip representation (always with a decimal point or exponent),
/// datetimes use `%Y-%m-%d %H:%M:%S%.f`, and nulls are empty cells. Ingesting the output
/// again yields the same dataset.
pub fn write_csv<W: Write>(dataset: &DataSet, writer: W) -> IngestionResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(format_cell))?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) => format!("{v:?}"),
        Value::Datetime(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        Value::Utf8(s) => s.clone(),
    }
}
