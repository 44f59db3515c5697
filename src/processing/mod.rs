//! Analysis over normalized datasets.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion and
//! computes what the dashboard views are drawn from. It is purely in-memory.
//!
//! - [`describe()`]: count/mean/std/min/quartiles/max per numeric column
//! - [`histogram()`]: equal-width bins for the distribution view
//! - [`trend()`]: (timestamp, value) pairs for the trend view
//!
//! ## Example
//!
//! ```rust
//! use transaction_insights::ingestion::{ingest_csv_from_bytes, NormalizeOptions};
//! use transaction_insights::processing::{describe, histogram, trend, DEFAULT_BINS};
//!
//! let csv = b"date,amount\n2024-01-02,20\n2024-01-01,10\n2024-01-03,x\n";
//! let ds = ingest_csv_from_bytes(csv, &NormalizeOptions::default()).unwrap();
//!
//! let summary = describe(&ds);
//! assert_eq!(summary[0].column, "amount");
//! assert_eq!(summary[0].count, 2);
//! assert_eq!(summary[0].mean, Some(15.0));
//!
//! let hist = histogram(&ds, "amount", DEFAULT_BINS).unwrap();
//! assert_eq!(hist.counts.iter().sum::<usize>(), 2);
//!
//! let points = trend(&ds, "date", "amount").unwrap();
//! assert_eq!(points[0].value, 10.0);
//! ```

pub mod describe;
pub mod histogram;
pub mod trend;

pub use describe::{describe, describe_column, ColumnSummary};
pub use histogram::{histogram, Histogram, DEFAULT_BINS};
pub use trend::{trend, TrendPoint};
