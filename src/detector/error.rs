//! Error types for the detector

use thiserror::Error;

/// Anomalies detected while ingesting telemetry.
///
/// These never escape [`super::PswDetector::ingest`]; they are logged and
/// folded into the returned output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("invalid or out-of-order timestamp {ts} (last accepted: {last:?})")]
    InvalidTimestamp { ts: f64, last: Option<f64> },

    #[error("degenerate run: pass_count={pass_count:?} total_tests={total_tests:?}")]
    DegenerateTotalTests {
        pass_count: Option<f64>,
        total_tests: Option<f64>,
    },
}

/// Threshold validation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold {key} must be a positive finite number, got {value}")]
    NonPositive { key: &'static str, value: f64 },
}
