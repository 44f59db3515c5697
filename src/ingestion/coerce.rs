//! Typed cell parsers and the column passes built on them.
//!
//! Every parser returns `Option`: `None` means "this cell does not coerce", never an error.
//! A pass applies one parser to every present cell of a column and counts successes, so the
//! caller can decide whether the column adopts the coerced values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::options::NormalizeOptions;

/// A successfully coerced numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// Result of one coercion pass over a column.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome<T> {
    /// Coerced value per row; `None` for missing or failed cells.
    pub values: Vec<Option<T>>,
    /// Number of cells that coerced.
    pub successes: usize,
}

impl<T> PassOutcome<T> {
    /// A pass counts only if at least one cell coerced.
    pub fn succeeded(&self) -> bool {
        self.successes > 0
    }
}

/// Parse a cell as an integer or float.
///
/// Integers win over floats. NaN spellings are not numbers; infinities are.
pub fn parse_numeric_cell(raw: &str) -> Option<Number> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(Number::Int(v));
    }
    match s.parse::<f64>() {
        Ok(v) if !v.is_nan() => Some(Number::Float(v)),
        _ => None,
    }
}

/// Parse a cell as a naive timestamp.
///
/// Tried in order: numeric epoch nanoseconds (if enabled), RFC 3339 (normalized to UTC),
/// the configured datetime formats, then the configured date formats at midnight.
pub fn parse_datetime_cell(raw: &str, opts: &NormalizeOptions) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if opts.numeric_epoch_dates {
        if let Some(n) = parse_numeric_cell(s) {
            return epoch_nanos(n);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in &opts.datetime_formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }

    opts.date_formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn epoch_nanos(n: Number) -> Option<NaiveDateTime> {
    let nanos = match n {
        Number::Int(v) => v,
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        Number::Float(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
            v as i64
        }
        Number::Float(_) => return None,
    };
    Some(DateTime::from_timestamp_nanos(nanos).naive_utc())
}

/// A numeric cell the datetime pass cannot place on the epoch-nanosecond timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfBoundsEpoch {
    /// 0-based data row of the offending cell.
    pub row: usize,
    pub value: String,
}

/// Run the datetime parser over every present cell.
///
/// With `numeric_epoch_dates` on, a numeric cell outside the `i64` nanosecond range (including
/// infinities) fails the whole pass, leaving the column as it was.
pub fn datetime_pass(
    cells: &[Option<String>],
    opts: &NormalizeOptions,
) -> Result<PassOutcome<NaiveDateTime>, OutOfBoundsEpoch> {
    if opts.numeric_epoch_dates {
        let overflow = cells.iter().enumerate().find_map(|(row, cell)| {
            let raw = cell.as_deref()?;
            let n = parse_numeric_cell(raw)?;
            epoch_nanos(n).is_none().then(|| OutOfBoundsEpoch {
                row,
                value: raw.to_owned(),
            })
        });
        if let Some(oob) = overflow {
            return Err(oob);
        }
    }
    Ok(run_pass(cells, |raw| parse_datetime_cell(raw, opts)))
}

/// Run the numeric parser over every present cell.
pub fn numeric_pass(cells: &[Option<String>]) -> PassOutcome<Number> {
    run_pass(cells, parse_numeric_cell)
}

fn run_pass<T, F>(cells: &[Option<String>], mut parse: F) -> PassOutcome<T>
where
    F: FnMut(&str) -> Option<T>,
{
    let mut successes = 0usize;
    let values = cells
        .iter()
        .map(|cell| {
            let parsed = cell.as_deref().and_then(&mut parse);
            if parsed.is_some() {
                successes += 1;
            }
            parsed
        })
        .collect();
    PassOutcome { values, successes }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{datetime_pass, numeric_pass, parse_datetime_cell, parse_numeric_cell, Number, OutOfBoundsEpoch};
    use crate::ingestion::options::NormalizeOptions;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn cells(raw: &[&str]) -> Vec<Option<String>> {
        raw.iter()
            .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
            .collect()
    }

    #[test]
    fn numeric_prefers_integers() {
        assert_eq!(parse_numeric_cell("42"), Some(Number::Int(42)));
        assert_eq!(parse_numeric_cell(" -7 "), Some(Number::Int(-7)));
        assert_eq!(parse_numeric_cell("12.50"), Some(Number::Float(12.5)));
        assert_eq!(parse_numeric_cell("1e3"), Some(Number::Float(1000.0)));
    }

    #[test]
    fn numeric_rejects_text_and_nan() {
        assert_eq!(parse_numeric_cell("x"), None);
        assert_eq!(parse_numeric_cell("$12.50"), None);
        assert_eq!(parse_numeric_cell("1,234"), None);
        assert_eq!(parse_numeric_cell("NaN"), None);
        assert_eq!(parse_numeric_cell("   "), None);
    }

    #[test]
    fn numeric_accepts_infinity() {
        assert_eq!(parse_numeric_cell("inf"), Some(Number::Float(f64::INFINITY)));
    }

    #[test]
    fn datetime_formats() {
        let opts = NormalizeOptions::default();
        assert_eq!(parse_datetime_cell("2023-01-02", &opts), Some(ts(2023, 1, 2, 0, 0, 0)));
        assert_eq!(
            parse_datetime_cell("2023-01-02 13:45:10", &opts),
            Some(ts(2023, 1, 2, 13, 45, 10))
        );
        assert_eq!(
            parse_datetime_cell("2023-01-02T13:45", &opts),
            Some(ts(2023, 1, 2, 13, 45, 0))
        );
        assert_eq!(parse_datetime_cell("03/15/2024", &opts), Some(ts(2024, 3, 15, 0, 0, 0)));
        assert_eq!(parse_datetime_cell("Mar 15, 2024", &opts), Some(ts(2024, 3, 15, 0, 0, 0)));
        assert_eq!(parse_datetime_cell("not-a-date", &opts), None);
    }

    #[test]
    fn datetime_rfc3339_is_normalized_to_utc() {
        let opts = NormalizeOptions::default();
        assert_eq!(
            parse_datetime_cell("2023-01-02T10:00:00+02:00", &opts),
            Some(ts(2023, 1, 2, 8, 0, 0))
        );
    }

    #[test]
    fn numbers_read_as_epoch_nanoseconds() {
        let opts = NormalizeOptions::default();
        let epoch = ts(1970, 1, 1, 0, 0, 0);
        assert_eq!(parse_datetime_cell("0", &opts), Some(epoch));
        assert_eq!(
            parse_datetime_cell("1000000000", &opts),
            Some(ts(1970, 1, 1, 0, 0, 1))
        );
        assert_eq!(parse_datetime_cell("inf", &opts), None);
        assert_eq!(parse_datetime_cell("1e300", &opts), None);
    }

    #[test]
    fn epoch_reading_can_be_disabled() {
        let opts = NormalizeOptions {
            numeric_epoch_dates: false,
            ..Default::default()
        };
        assert_eq!(parse_datetime_cell("5", &opts), None);
        // Still a compact date format.
        assert_eq!(parse_datetime_cell("20230101", &opts), Some(ts(2023, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn pass_counts_successes_and_skips_missing() {
        let opts = NormalizeOptions::default();
        let out = datetime_pass(&cells(&["2023-01-01", "", "nope"]), &opts).unwrap();
        assert_eq!(out.successes, 1);
        assert_eq!(out.values, vec![Some(ts(2023, 1, 1, 0, 0, 0)), None, None]);
        assert!(out.succeeded());

        let out = numeric_pass(&cells(&["x", "y"]));
        assert_eq!(out.successes, 0);
        assert!(!out.succeeded());
    }

    #[test]
    fn numbers_beyond_epoch_range_fail_the_datetime_pass() {
        let opts = NormalizeOptions::default();
        for big in ["1e19", "12345678901234567890", "inf", "-inf"] {
            let err = datetime_pass(&cells(&["100", big, "2023-01-01"]), &opts).unwrap_err();
            assert_eq!(
                err,
                OutOfBoundsEpoch {
                    row: 1,
                    value: big.to_string(),
                }
            );
        }
    }

    #[test]
    fn epoch_range_is_not_checked_when_disabled() {
        let opts = NormalizeOptions {
            numeric_epoch_dates: false,
            ..Default::default()
        };
        let out = datetime_pass(&cells(&["1e19", "2023-01-01"]), &opts).unwrap();
        assert_eq!(out.values, vec![None, Some(ts(2023, 1, 1, 0, 0, 0))]);
    }
}
