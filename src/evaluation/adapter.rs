//! Maps external run reports onto `run_tests` telemetry

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::constants::{ERROR_CLASS_ASSERTION_MISMATCH, ERROR_CLASS_EXECUTION};
use crate::models::telemetry::TelemetryEvent;

use super::report::ExternalRunReport;

/// An identifier ending in `Error` or `Exception`, e.g. `ValueError`
static ERROR_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:Error|Exception)").expect("Invalid regex pattern")
});

/// Build the `run_tests` event for an external run observed at `ts`
pub fn map_run(report: &ExternalRunReport, ts: f64) -> TelemetryEvent {
    let total_tests = report.passed.saturating_add(report.failed).max(0);

    TelemetryEvent::run_tests(ts, report.passed, total_tests)
        .with_duration_ms(report.runtime_ms)
        .with_payload(
            "error_class",
            classify_failure(report).map_or(Value::Null, Value::from),
        )
        .with_payload("oracle_version_id", report.version_id.clone())
}

/// Classify why an external run failed.
///
/// Uses the first non-empty failure error: the first exception-like name in
/// it, or `execution_error` when there is none. Without any error text the
/// run is an `assertion_mismatch` if tests failed, and unclassified otherwise.
pub fn classify_failure(report: &ExternalRunReport) -> Option<String> {
    match report.first_error() {
        Some(error) => Some(
            ERROR_CLASS_RE
                .find(error)
                .map_or(ERROR_CLASS_EXECUTION, |m| m.as_str())
                .to_string(),
        ),
        None if report.failed > 0 => Some(ERROR_CLASS_ASSERTION_MISMATCH.to_string()),
        None => None,
    }
}
