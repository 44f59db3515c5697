//! Unified ingestion entrypoints.
//!
//! Most callers should use [`ingest_from_path`] or, for uploads held in memory,
//! [`ingest_from_bytes`]. Both normalize the CSV into a [`crate::types::DataSet`] and, if an
//! [`super::observability::IngestionObserver`] is configured, report success/failure/alerts
//! to it.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

use super::csv::read_raw_table;
use super::normalize::{normalize, Normalized};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::options::NormalizeOptions;

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Tokenizing and coercion options.
    pub normalize: NormalizeOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("normalize", &self.normalize)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest a CSV file.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column/dropped-column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use transaction_insights::ingestion::{ingest_from_path, IngestionOptions, TracingObserver};
///
/// # fn main() -> Result<(), transaction_insights::IngestionError> {
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     ..Default::default()
/// };
/// let ds = ingest_from_path("transactions.csv", &opts)?;
/// println!("numeric columns: {:?}", ds.numeric_columns());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let ctx = IngestionContext {
        source: path.display().to_string(),
    };
    let result = File::open(path)
        .map_err(IngestionError::from)
        .and_then(|file| run(file, &options.normalize));
    report(&ctx, options, result)
}

/// Ingest CSV from any reader; `label` identifies the source in observer callbacks.
pub fn ingest_from_reader<R: Read>(
    label: &str,
    reader: R,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let ctx = IngestionContext {
        source: label.to_owned(),
    };
    let result = run(reader, &options.normalize);
    report(&ctx, options, result)
}

/// Ingest an in-memory upload; `label` is typically the uploaded file name.
///
/// ```
/// use transaction_insights::ingestion::{ingest_from_bytes, IngestionOptions};
/// use transaction_insights::types::ColumnKind;
///
/// let csv = b"date ,amount\n2024-01-05,12.50\n2024-01-06,oops\n";
/// let ds = ingest_from_bytes("upload.csv", csv, &IngestionOptions::default())?;
/// assert_eq!(ds.kind_of("date"), Some(ColumnKind::Datetime));
/// assert_eq!(ds.numeric_values("amount"), Some(vec![Some(12.5), None]));
/// # Ok::<(), transaction_insights::IngestionError>(())
/// ```
pub fn ingest_from_bytes(label: &str, bytes: &[u8], options: &IngestionOptions) -> IngestionResult<DataSet> {
    ingest_from_reader(label, bytes, options)
}

fn run<R: Read>(reader: R, opts: &NormalizeOptions) -> IngestionResult<Normalized> {
    let raw = read_raw_table(reader, opts)?;
    Ok(normalize(raw, opts))
}

fn report(
    ctx: &IngestionContext,
    options: &IngestionOptions,
    result: IngestionResult<Normalized>,
) -> IngestionResult<DataSet> {
    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(normalized) => obs.on_success(
                ctx,
                &IngestionStats {
                    rows: normalized.dataset.row_count(),
                    columns: normalized.dataset.column_count(),
                    dropped_columns: normalized.report.dropped_columns.clone(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    result.map(|n| n.dataset)
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::EmptyInput
        | IngestionError::RaggedRow { .. }
        | IngestionError::UnterminatedQuote { .. }
        | IngestionError::Config { .. } => IngestionSeverity::Error,
    }
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue ingestion work in a job system.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request by calling [`ingest_from_path`].
    pub fn run(&self) -> IngestionResult<DataSet> {
        ingest_from_path(&self.path, &self.options)
    }
}
