use transaction_insights::AnalysisError;
use transaction_insights::anomaly::{
    annotate, detect_anomalies, suspicious_rows, AnomalyLabel, IsolationForestOptions, ANOMALY_COLUMN,
};
use transaction_insights::ingestion::{ingest_csv_from_bytes, ingest_csv_from_path, NormalizeOptions};
use transaction_insights::types::{ColumnKind, DataSet, Value};

/// 200 ordinary card payments with two large transfers at rows 50 and 150.
fn ledger() -> DataSet {
    let mut csv = String::from("Merchant,Amount\n");
    for i in 0..200 {
        let amount = match i {
            50 => 5000.0,
            150 => 7000.0,
            _ => 20.0 + (i % 10) as f64,
        };
        csv.push_str(&format!("shop-{},{amount}\n", i % 7));
    }
    ingest_csv_from_bytes(csv.as_bytes(), &NormalizeOptions::default()).unwrap()
}

fn with_contamination(contamination: f64) -> IsolationForestOptions {
    IsolationForestOptions {
        contamination,
        ..Default::default()
    }
}

#[test]
fn large_transfers_are_flagged() {
    let ds = ledger();
    let report = detect_anomalies(&ds, "Amount", &with_contamination(0.01)).unwrap();

    assert_eq!(report.labels.len(), 200);
    assert_eq!(report.anomaly_count(), 2);
    assert_eq!(report.labels[50], Some(AnomalyLabel::Anomaly));
    assert_eq!(report.labels[150], Some(AnomalyLabel::Anomaly));

    let flagged = suspicious_rows(&ds, &report);
    assert_eq!(flagged.schema, ds.schema);
    assert_eq!(flagged.numeric_values("Amount"), Some(vec![Some(5000.0), Some(7000.0)]));
}

#[test]
fn same_seed_gives_same_report() {
    let ds = ledger();
    let opts = IsolationForestOptions {
        num_threads: Some(2),
        ..with_contamination(0.05)
    };
    let a = detect_anomalies(&ds, "Amount", &opts).unwrap();
    let b = detect_anomalies(&ds, "Amount", &with_contamination(0.05)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn annotated_dataset_carries_labels() {
    let ds = ledger();
    let report = detect_anomalies(&ds, "Amount", &with_contamination(0.01)).unwrap();
    let out = annotate(&ds, &report).unwrap();

    assert_eq!(out.column_count(), ds.column_count() + 1);
    assert_eq!(out.kind_of(ANOMALY_COLUMN), Some(ColumnKind::Other));
    assert_eq!(out.rows[50][2], Value::Utf8("Anomaly".to_string()));
    assert_eq!(out.rows[0][2], Value::Utf8("Normal".to_string()));
}

#[test]
fn missing_amounts_stay_unlabeled() {
    let ds = ingest_csv_from_path("tests/fixtures/transactions.csv", &NormalizeOptions::default()).unwrap();
    let report = detect_anomalies(&ds, "Amount", &with_contamination(0.2)).unwrap();

    assert_eq!(report.labels.len(), 5);
    assert_eq!(report.labels[2], None);
    assert_eq!(report.scores[2], None);
    assert!(report.anomaly_count() <= 1);
}

#[test]
fn text_columns_are_rejected() {
    let err = detect_anomalies(&ledger(), "Merchant", &IsolationForestOptions::default()).unwrap_err();
    assert_eq!(err, AnalysisError::NotNumeric { column: "Merchant".into() });
}
