//! `transaction-insights` turns an uploaded CSV of financial transactions into a typed,
//! in-memory [`types::DataSet`] without a user-provided schema, and computes the statistics,
//! chart series and outlier flags an exploratory dashboard shows for it.
//!
//! The primary entrypoints are [`ingestion::ingest_from_path`] and
//! [`ingestion::ingest_from_bytes`].
//!
//! ## How columns are typed
//!
//! Ingestion is best-effort and never fails on cell content:
//!
//! 1. Header names are trimmed.
//! 2. Every column gets a **datetime pass**: if any cell parses as a date/time, the column
//!    becomes [`types::ColumnKind::Datetime`] and the cells that did not parse become
//!    [`types::Value::Null`].
//! 3. Every column then gets a **numeric pass** on the result: if any cell parses as a number,
//!    the column becomes [`types::ColumnKind::Numeric`], again nulling the failures. This
//!    includes columns the datetime pass just claimed.
//! 4. Columns in which every cell is missing are dropped.
//!
//! Numbers are read as epoch nanoseconds by the datetime pass, so a plain numeric column
//! briefly passes through `Datetime` before the numeric pass reclaims it. Both switches live in
//! [`ingestion::NormalizeOptions`].
//!
//! Only structural problems (unreadable input, invalid UTF-8, rows longer than the header,
//! a quoted field left open at end of input, no header at all) produce an [`IngestionError`].
//!
//! ## Quick example: ingest an upload
//!
//! ```rust
//! use transaction_insights::ingestion::{ingest_from_bytes, IngestionOptions};
//! use transaction_insights::types::{ColumnKind, Value};
//!
//! # fn main() -> Result<(), transaction_insights::IngestionError> {
//! let upload = b" Date ,Amount,Merchant,Notes\n\
//!     2024-03-01,12.50,Cafe,\n\
//!     2024-03-02,n/a,Grocer,\n\
//!     2024-03-03,80,Rent,\n";
//! let ds = ingest_from_bytes("march.csv", upload, &IngestionOptions::default())?;
//!
//! assert_eq!(ds.row_count(), 3);
//! // `Notes` was empty everywhere and is gone.
//! assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["Date", "Amount", "Merchant"]);
//! assert_eq!(ds.kind_of("Date"), Some(ColumnKind::Datetime));
//! assert_eq!(ds.kind_of("Merchant"), Some(ColumnKind::Other));
//! assert_eq!(ds.numeric_values("Amount"), Some(vec![Some(12.5), None, Some(80.0)]));
//! assert_eq!(ds.rows[1][2], Value::Utf8("Grocer".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV tokenizing, the type normalizer, options, observers
//! - [`types`]: schema + in-memory dataset types
//! - [`processing`]: summary statistics, histogram bins, time-series pairs
//! - [`anomaly`]: Isolation Forest outlier labels for one numeric column
//! - [`error`]: error types

pub mod anomaly;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{AnalysisError, AnalysisResult, IngestionError, IngestionResult};
