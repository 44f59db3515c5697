//! Summary statistics for numeric columns.

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{ColumnKind, DataSet};

/// Summary of one numeric column. Nulls are ignored throughout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Number of non-null values.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator); `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarize every numeric column, in schema order.
pub fn describe(dataset: &DataSet) -> Vec<ColumnSummary> {
    dataset
        .numeric_columns()
        .into_iter()
        .filter_map(|name| describe_column(dataset, name).ok())
        .collect()
}

/// Summarize a single numeric column.
///
/// - Returns [`AnalysisError::UnknownColumn`] if `column` does not exist.
/// - Returns [`AnalysisError::NotNumeric`] if it is not classified numeric.
pub fn describe_column(dataset: &DataSet, column: &str) -> AnalysisResult<ColumnSummary> {
    let values = numeric_column(dataset, column)?;
    let mut sorted: Vec<f64> = values.into_iter().flatten().collect();
    sorted.sort_by(f64::total_cmp);
    Ok(summarize(column, &sorted))
}

/// Non-null values of a numeric column, or the reason there are none.
pub(crate) fn numeric_column(dataset: &DataSet, column: &str) -> AnalysisResult<Vec<Option<f64>>> {
    match dataset.kind_of(column) {
        None => Err(AnalysisError::UnknownColumn {
            column: column.to_owned(),
        }),
        Some(ColumnKind::Numeric) => Ok(dataset.numeric_values(column).unwrap_or_default()),
        Some(_) => Err(AnalysisError::NotNumeric {
            column: column.to_owned(),
        }),
    }
}

fn summarize(column: &str, sorted: &[f64]) -> ColumnSummary {
    let count = sorted.len();
    let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
    let std = match (mean, count) {
        (Some(m), n) if n >= 2 => {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    ColumnSummary {
        column: column.to_owned(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Linear-interpolation quantile of an ascending slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
