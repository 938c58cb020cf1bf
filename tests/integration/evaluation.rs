//! Evaluation router feeding a detector

use std::fs;

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

use psw::detector::{PswConfig, PswDetector, PswState};
use psw::evaluation::{
    map_run, EvaluationError, EvaluationRouter, EvaluationSource, ExternalRunReport,
    RecordedRunEvaluator,
};
use psw::models::{EventKind, TelemetryEvent};
use psw::settings::Settings;

fn report_json() -> serde_json::Value {
    json!({
        "run_id": "run_42",
        "version_id": "ver_1",
        "pass_rate": 0.5,
        "passed": 2,
        "failed": 2,
        "failures_summary": [
            {"test_name": "t1", "input": [1, 2], "expected": 3, "got": null,
             "error": "Traceback (most recent call last):\nValueError: bad", "hidden": false},
            {"test_name": "t2", "input": [0], "expected": 0, "got": 1, "hidden": true}
        ],
        "oracle_confidence_used": 0.9,
        "runtime_ms": 333,
        "log_id": "log_42"
    })
}

#[test]
fn test_external_report_maps_to_run_event() {
    let report: ExternalRunReport = serde_json::from_value(report_json()).unwrap();
    let event = map_run(&report, 1000.0);

    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({
            "ts": 1000.0,
            "type": "run_tests",
            "payload": {
                "pass_count": 2,
                "total_tests": 4,
                "duration_ms": 333,
                "error_class": "ValueError",
                "oracle_version_id": "ver_1"
            }
        })
    );
}

#[test]
fn test_external_runs_drive_the_detector() {
    let router = EvaluationRouter::new(true, Some("ver_1".to_string()));
    let mut detector = PswDetector::new(PswConfig::default());
    let mut ts = 0.0;

    let mut passed = 0;
    for _ in 0..3 {
        let report: ExternalRunReport = serde_json::from_value(report_json()).unwrap();
        let mut external = |_: &str| -> Result<ExternalRunReport> {
            Ok(ExternalRunReport {
                passed,
                failed: 4 - passed,
                ..report.clone()
            })
        };
        let mut local = || -> Result<TelemetryEvent> { unreachable!("local path not routed") };

        let routed = router.route(&mut local, &mut external).unwrap();
        assert_eq!(routed.source, EvaluationSource::External);

        // Re-stamp with a deterministic clock for the detector
        ts += 1000.0;
        let event = TelemetryEvent { ts, ..routed.event };
        let output = detector.ingest(&event);

        assert_eq!(output.thresholds.total_tests, Some(4.0));
        if passed > 0 {
            assert!(output.reason.starts_with("significant_progress"));
        }
        passed += 1;
    }

    assert_eq!(detector.best_score(), 0.5);
}

#[test]
fn test_recorded_local_run_passes_through() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"ts": 500, "type": "run_tests", "payload": {"pass_count": 1, "total_tests": 1}}"#,
    )
    .unwrap();

    let router = EvaluationRouter::new(false, None);
    let mut local = RecordedRunEvaluator::new(&path);
    let mut external =
        |_: &str| -> Result<ExternalRunReport> { unreachable!("external path not routed") };

    let routed = router.route(&mut local, &mut external).unwrap();
    assert_eq!(routed.source, EvaluationSource::Local);
    assert_eq!(routed.event.kind, EventKind::RunTests);

    let output = PswDetector::new(PswConfig::default()).ingest(&routed.event);
    assert_eq!(output.state, PswState::InPsw);
    assert_eq!(output.metrics.best_score, 1.0);
}

#[test]
fn test_settings_with_unbound_version_fail_fast() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("psw.toml");
    fs::write(&path, "[evaluation]\nuse_external = true\nversion_id = \"\"\n").unwrap();

    let settings = Settings::load(&path).unwrap();
    let router = EvaluationRouter::new(
        settings.evaluation.use_external,
        settings.evaluation.version_id.clone(),
    );

    let mut local = || -> Result<TelemetryEvent> { Ok(TelemetryEvent::run_tests(0.0, 0, 1)) };
    let mut external = |_: &str| -> Result<ExternalRunReport> { Ok(ExternalRunReport::default()) };

    let err = router.route(&mut local, &mut external).unwrap_err();
    assert!(matches!(err, EvaluationError::OracleVersionMissing));
}

#[test]
fn test_loosely_typed_report_still_maps() {
    let report: ExternalRunReport = serde_json::from_value(json!({
        "version_id": "ver_1",
        "passed": "2",
        "failed": null,
        "runtime_ms": 333.0,
        "failures_summary": [{"test_name": "t1", "error": 7}]
    }))
    .unwrap();
    let event = map_run(&report, 1000.0);

    assert_eq!(
        serde_json::to_value(&event).unwrap()["payload"],
        json!({
            "pass_count": 2,
            "total_tests": 2,
            "duration_ms": 333,
            "error_class": "execution_error",
            "oracle_version_id": "ver_1"
        })
    );
}
