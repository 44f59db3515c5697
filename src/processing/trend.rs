//! Time-series pairing of a datetime column with a numeric column.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{ColumnKind, DataSet};

use super::describe::numeric_column;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub at: NaiveDateTime,
    pub value: f64,
}

/// Rows where both cells are present, ordered by timestamp.
///
/// The sort is stable, so rows sharing a timestamp keep their input order.
pub fn trend(dataset: &DataSet, time_column: &str, value_column: &str) -> AnalysisResult<Vec<TrendPoint>> {
    let times = match dataset.kind_of(time_column) {
        None => {
            return Err(AnalysisError::UnknownColumn {
                column: time_column.to_owned(),
            });
        }
        Some(ColumnKind::Datetime) => dataset.datetime_values(time_column).unwrap_or_default(),
        Some(_) => {
            return Err(AnalysisError::NotDatetime {
                column: time_column.to_owned(),
            });
        }
    };
    let values = numeric_column(dataset, value_column)?;

    let mut points: Vec<TrendPoint> = times
        .into_iter()
        .zip(values)
        .filter_map(|(at, value)| Some(TrendPoint { at: at?, value: value? }))
        .collect();
    points.sort_by_key(|p| p.at);
    Ok(points)
}
