//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_from_bytes`] (from [`unified`]),
//! which:
//!
//! - tokenize the CSV into a [`RawTable`] (missing markers, padded short rows)
//! - normalize it into a typed [`crate::types::DataSet`] (see [`normalize()`])
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! The lower-level pieces are also public:
//! - [`csv`]: tokenizing and reader-based ingestion
//! - [`coerce`]: per-cell datetime/numeric parsers
//! - [`mod@normalize`]: the two-pass normalizer and its [`NormalizeReport`]

pub mod coerce;
pub mod csv;
pub mod normalize;
pub mod observability;
pub mod options;
pub mod unified;

pub use self::csv::{ingest_csv_from_bytes, ingest_csv_from_path, ingest_csv_from_reader, write_csv, RawTable};
pub use normalize::{normalize, NormalizeReport, Normalized};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use options::{NormalizeOptions, UnparsedText};
pub use unified::{ingest_from_bytes, ingest_from_path, ingest_from_reader, IngestionOptions, IngestionRequest};
