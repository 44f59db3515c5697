use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for analysis operations (statistics, series, outliers).
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type returned by ingestion functions.
///
/// Only structural problems with the input are errors. Cells that fail to coerce never surface
/// here; they become [`crate::types::Value::Null`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizing error (including invalid UTF-8).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input has no header row, so there are no columns to parse.
    #[error("no columns to parse from input")]
    EmptyInput,

    /// A data row has more fields than the header.
    #[error("malformed row {row}: expected {expected} fields, saw {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A quoted field was still open when the input ended.
    #[error("unterminated quoted field in row {row}")]
    UnterminatedQuote { row: usize },

    /// Normalization options could not be loaded.
    #[error("invalid normalize options: {message}")]
    Config { message: String },
}

/// Error type returned by operations over a normalized [`crate::types::DataSet`].
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// The named column is not in the dataset schema.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// The named column exists but is not classified as numeric.
    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },

    /// The named column exists but is not classified as datetime.
    #[error("column '{column}' is not a datetime column")]
    NotDatetime { column: String },

    /// Contamination ratio outside the accepted range.
    #[error("contamination must be within [{min}, {max}], got {value}")]
    InvalidContamination { value: f64, min: f64, max: f64 },

    /// Histogram requested with zero bins.
    #[error("histogram needs at least one bin")]
    InvalidBins,

    /// Too few non-null values to fit a model.
    #[error("column '{column}' has {found} usable values, need at least {required}")]
    NotEnoughRows {
        column: String,
        found: usize,
        required: usize,
    },

    /// A derived column does not have one value per row.
    #[error("column '{column}' has {found} values, dataset has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Worker pool for forest construction could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
