//! Outlier flags for a single numeric column.
//!
//! [`detect_anomalies`] fits an Isolation Forest to the non-null values of one column and labels
//! each row [`AnomalyLabel::Normal`] or [`AnomalyLabel::Anomaly`]. The share of rows labeled
//! anomalous follows the contamination ratio.
//!
//! ```rust
//! use transaction_insights::anomaly::{detect_anomalies, suspicious_rows, IsolationForestOptions};
//! use transaction_insights::ingestion::{ingest_csv_from_bytes, NormalizeOptions};
//!
//! let mut csv = String::from("amount\n");
//! for i in 0..99 {
//!     csv.push_str(&format!("{}\n", 20.0 + (i % 10) as f64));
//! }
//! csv.push_str("9500\n");
//! let ds = ingest_csv_from_bytes(csv.as_bytes(), &NormalizeOptions::default()).unwrap();
//!
//! let opts = IsolationForestOptions { contamination: 0.01, ..Default::default() };
//! let report = detect_anomalies(&ds, "amount", &opts).unwrap();
//! let flagged = suspicious_rows(&ds, &report);
//! assert_eq!(flagged.row_count(), 1);
//! assert_eq!(flagged.numeric_values("amount"), Some(vec![Some(9500.0)]));
//! ```

mod forest;

use std::fmt;

use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::processing::describe::{numeric_column, quantile};
use crate::types::{DataSet, DataType, Field, Value};

use forest::IsolationForest;

/// Smallest accepted contamination ratio.
pub const MIN_CONTAMINATION: f64 = 0.01;
/// Largest accepted contamination ratio.
pub const MAX_CONTAMINATION: f64 = 0.2;

/// Name of the column [`annotate`] appends.
pub const ANOMALY_COLUMN: &str = "Anomaly";

/// Isolation Forest parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestOptions {
    /// Number of trees (at least one is always grown).
    pub n_estimators: usize,
    /// Subsample size per tree, capped at the number of usable values.
    pub max_samples: usize,
    /// Expected share of outliers, within [`MIN_CONTAMINATION`, `MAX_CONTAMINATION`].
    pub contamination: f64,
    /// Seed; equal seeds give equal reports.
    pub random_state: u64,
    /// Worker threads for tree construction. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
}

impl Default for IsolationForestOptions {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            random_state: 42,
            num_threads: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyLabel::Normal => "Normal",
            AnomalyLabel::Anomaly => "Anomaly",
        }
    }
}

impl fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-row outcome of [`detect_anomalies`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// Column the model was fitted on.
    pub column: String,
    /// One entry per dataset row; `None` where the value was missing or non-finite.
    pub labels: Vec<Option<AnomalyLabel>>,
    /// Negated anomaly score per row (lower is more abnormal); `None` where unscored.
    pub scores: Vec<Option<f64>>,
    /// Score threshold: rows scoring strictly below it are anomalies.
    pub offset: f64,
}

impl AnomalyReport {
    pub fn anomaly_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| **l == Some(AnomalyLabel::Anomaly))
            .count()
    }
}

/// Fit an Isolation Forest to `column` and label every row.
///
/// Errors:
///
/// - [`AnalysisError::InvalidContamination`] if the ratio is outside
///   [`MIN_CONTAMINATION`]..=[`MAX_CONTAMINATION`]
/// - [`AnalysisError::UnknownColumn`] / [`AnalysisError::NotNumeric`] for a bad column
/// - [`AnalysisError::NotEnoughRows`] with fewer than two usable values
pub fn detect_anomalies(
    dataset: &DataSet,
    column: &str,
    opts: &IsolationForestOptions,
) -> AnalysisResult<AnomalyReport> {
    if !(MIN_CONTAMINATION..=MAX_CONTAMINATION).contains(&opts.contamination) {
        return Err(AnalysisError::InvalidContamination {
            value: opts.contamination,
            min: MIN_CONTAMINATION,
            max: MAX_CONTAMINATION,
        });
    }

    let cells: Vec<Option<f64>> = numeric_column(dataset, column)?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    let data: Vec<f64> = cells.iter().flatten().copied().collect();
    if data.len() < 2 {
        return Err(AnalysisError::NotEnoughRows {
            column: column.to_owned(),
            found: data.len(),
            required: 2,
        });
    }

    let n_trees = opts.n_estimators.max(1);
    let sample_size = opts.max_samples.clamp(2, data.len());
    let fit_and_score = || {
        let forest = IsolationForest::fit(&data, n_trees, sample_size, opts.random_state);
        forest.score_samples(&data)
    };
    let scored = match opts.num_threads {
        Some(n) => ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| AnalysisError::ThreadPool(e.to_string()))?
            .install(fit_and_score),
        None => fit_and_score(),
    };

    let mut sorted = scored.clone();
    sorted.sort_by(f64::total_cmp);
    let offset = quantile(&sorted, opts.contamination).unwrap_or(f64::NEG_INFINITY);

    let mut scored_iter = scored.into_iter();
    let scores: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| cell.and_then(|_| scored_iter.next()))
        .collect();
    let labels: Vec<Option<AnomalyLabel>> = scores
        .iter()
        .map(|s| {
            s.map(|s| {
                if s < offset {
                    AnomalyLabel::Anomaly
                } else {
                    AnomalyLabel::Normal
                }
            })
        })
        .collect();

    let report = AnomalyReport {
        column: column.to_owned(),
        labels,
        scores,
        offset,
    };
    debug!(
        column,
        scored = data.len(),
        anomalies = report.anomaly_count(),
        offset,
        "isolation forest labeled rows"
    );
    Ok(report)
}

/// Rows labeled [`AnomalyLabel::Anomaly`], with the original schema.
pub fn suspicious_rows(dataset: &DataSet, report: &AnomalyReport) -> DataSet {
    dataset.filter_rows(|idx, _| report.labels.get(idx) == Some(&Some(AnomalyLabel::Anomaly)))
}

/// The dataset with a trailing `Anomaly` text column (`Normal`/`Anomaly`, null if unscored).
///
/// Returns [`AnalysisError::LengthMismatch`] if `report` was computed for a dataset with a
/// different row count.
pub fn annotate(dataset: &DataSet, report: &AnomalyReport) -> AnalysisResult<DataSet> {
    let values = report
        .labels
        .iter()
        .map(|l| match l {
            Some(label) => Value::Utf8(label.as_str().to_owned()),
            None => Value::Null,
        })
        .collect();
    dataset.with_column(Field::new(ANOMALY_COLUMN, DataType::Utf8), values)
}
