//! Equal-width histogram bins for a numeric column.

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::DataSet;

use super::describe::numeric_column;

/// Bin count used by the distribution view.
pub const DEFAULT_BINS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `bins + 1` ascending edges; bin `i` covers `[edges[i], edges[i + 1])`, the last bin
    /// also includes its right edge. Empty when the column has no values.
    pub edges: Vec<f64>,
    /// Count per bin.
    pub counts: Vec<usize>,
}

/// Bin the non-null, finite values of `column` into `bins` equal-width bins.
pub fn histogram(dataset: &DataSet, column: &str, bins: usize) -> AnalysisResult<Histogram> {
    if bins == 0 {
        return Err(AnalysisError::InvalidBins);
    }
    let values: Vec<f64> = numeric_column(dataset, column)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();

    let (Some(lo), Some(hi)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Ok(Histogram {
            column: column.to_owned(),
            edges: Vec::new(),
            counts: Vec::new(),
        });
    };

    let (lo, hi) = if lo == hi { widen(lo) } else { (lo, hi) };
    // Interpolated and halved so that ranges wider than f64::MAX stay finite.
    let edges: Vec<f64> = (0..=bins)
        .map(|i| {
            let t = i as f64 / bins as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect();
    let half_span = hi / 2.0 - lo / 2.0;

    let mut counts = vec![0usize; bins];
    for v in values {
        let t = (v / 2.0 - lo / 2.0) / half_span;
        let idx = ((t * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        column: column.to_owned(),
        edges,
        counts,
    })
}

/// Range around a single distinct value: ±0.5, or wider when that would vanish in rounding.
fn widen(v: f64) -> (f64, f64) {
    let delta = 0.5f64.max(v.abs() * f64::EPSILON * 64.0);
    ((v - delta).max(f64::MIN), (v + delta).min(f64::MAX))
}
