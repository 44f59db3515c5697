use chrono::{NaiveDate, NaiveDateTime};

use transaction_insights::AnalysisError;
use transaction_insights::ingestion::{ingest_csv_from_path, NormalizeOptions};
use transaction_insights::processing::{describe, describe_column, histogram, trend, DEFAULT_BINS};
use transaction_insights::types::DataSet;

fn fixture() -> DataSet {
    ingest_csv_from_path("tests/fixtures/transactions.csv", &NormalizeOptions::default()).unwrap()
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn describe_summarizes_numeric_columns_in_schema_order() {
    let ds = fixture();
    let summary = describe(&ds);
    let names: Vec<&str> = summary.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(names, vec!["Transaction ID", "Amount", "Balance"]);

    let ids = &summary[0];
    assert_eq!(ids.count, 5);
    assert!(close(ids.mean, 1003.0));
    assert!(close(ids.median, 1003.0));
    assert!(close(ids.min, 1001.0));
    assert!(close(ids.max, 1005.0));
}

#[test]
fn describe_ignores_missing_amounts() {
    let amount = describe_column(&fixture(), "Amount").unwrap();
    assert_eq!(amount.count, 4);
    assert!(close(amount.mean, 940.9875));
    assert!(close(amount.min, 18.75));
    assert!(close(amount.median, 622.6));
    assert!(close(amount.max, 2500.0));
}

#[test]
fn describe_rejects_non_numeric_columns() {
    let ds = fixture();
    assert_eq!(
        describe_column(&ds, "Date").unwrap_err(),
        AnalysisError::NotNumeric { column: "Date".into() }
    );
    assert_eq!(
        describe_column(&ds, "Notes").unwrap_err(),
        AnalysisError::UnknownColumn { column: "Notes".into() }
    );
}

#[test]
fn histogram_bins_every_present_amount() {
    let hist = histogram(&fixture(), "Amount", DEFAULT_BINS).unwrap();
    assert_eq!(hist.counts.len(), DEFAULT_BINS);
    assert_eq!(hist.edges.len(), DEFAULT_BINS + 1);
    assert_eq!(hist.counts.iter().sum::<usize>(), 4);
    assert_eq!(hist.counts[0], 2);
    assert_eq!(hist.counts[DEFAULT_BINS - 1], 1);
}

#[test]
fn trend_pairs_dates_with_amounts() {
    let points = trend(&fixture(), "Date", "Amount").unwrap();
    let got: Vec<(NaiveDateTime, f64)> = points.iter().map(|p| (p.at, p.value)).collect();
    // Row 3 has no amount and row 5 has no date.
    assert_eq!(got, vec![(day(2), 45.2), (day(3), 1200.0), (day(7), 18.75)]);
}

#[test]
fn trend_needs_a_datetime_axis() {
    assert_eq!(
        trend(&fixture(), "Merchant", "Amount").unwrap_err(),
        AnalysisError::NotDatetime { column: "Merchant".into() }
    );
}
