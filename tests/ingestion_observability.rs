use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use transaction_insights::ingestion::{
    ingest_from_bytes, ingest_from_path, CompositeObserver, FileObserver, IngestionContext, IngestionObserver,
    IngestionOptions, IngestionRequest, IngestionSeverity, IngestionStats,
};
use transaction_insights::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: &IngestionStats) {
        self.successes.lock().unwrap().push(stats.clone());
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("transaction-insights-observer-{nanos}.{ext}"))
}

fn options_with(obs: Arc<RecordingObserver>, threshold: IngestionSeverity) -> IngestionOptions {
    IngestionOptions {
        observer: Some(obs as Arc<dyn IngestionObserver>),
        alert_at_or_above: threshold,
        ..Default::default()
    }
}

#[test]
fn observer_receives_stats_with_dropped_columns() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Critical);

    let ds = ingest_from_path("tests/fixtures/transactions.csv", &opts).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![IngestionStats {
            rows: 5,
            columns: ds.column_count(),
            dropped_columns: vec!["Notes".to_string()],
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Critical);

    // Missing file -> Io error -> Critical
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Critical);

    // Ragged row -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_bytes("upload.csv", b"a,b\n1,2,3\n", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_parse_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Error);

    let _ = ingest_from_bytes("upload.csv", b"", &opts).unwrap_err();

    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_fans_out_to_every_observer() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![a.clone(), b.clone()];
    let composite = CompositeObserver::new(observers);
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    ingest_from_bytes("upload.csv", b"x\n1\n", &opts).unwrap();

    assert_eq!(a.successes.lock().unwrap().len(), 1);
    assert_eq!(b.successes.lock().unwrap().len(), 1);
}

#[test]
fn file_observer_appends_lines() {
    let log = tmp_file("log");
    let opts = IngestionOptions {
        observer: Some(Arc::new(FileObserver::new(&log))),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };

    ingest_from_bytes("good.csv", b"x\n1\n", &opts).unwrap();
    let _ = ingest_from_bytes("bad.csv", b"", &opts).unwrap_err();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ok source=good.csv rows=1 columns=1"));
    assert!(lines[1].contains("fail severity=Error source=bad.csv"));
    assert!(lines[2].contains("ALERT severity=Error source=bad.csv"));
    let _ = std::fs::remove_file(&log);
}

#[test]
fn request_runs_with_its_options() {
    let obs = Arc::new(RecordingObserver::default());
    let req = IngestionRequest {
        path: PathBuf::from("tests/fixtures/transactions.csv"),
        options: options_with(obs.clone(), IngestionSeverity::Critical),
    };
    let ds = req.run().unwrap();
    assert_eq!(ds.row_count(), 5);
    assert_eq!(obs.successes.lock().unwrap().len(), 1);
}
