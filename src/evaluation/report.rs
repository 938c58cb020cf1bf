//! Report schema returned by the external test evaluator

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::telemetry::coerce_number;

/// One failing test in an external run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureItem {
    pub test_name: String,
    pub input: Value,
    pub expected: Value,
    pub got: Value,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_error"
    )]
    pub error: Option<String>,
    pub hidden: bool,
}

/// Result of running a learner's code against an external evaluator.
///
/// Only `passed`, `failed`, `runtime_ms`, `version_id` and the failure
/// `error` strings feed the detector; the rest is carried for callers.
/// Numeric fields go through [`coerce_number`], so `null`, numeric strings
/// and integral floats are accepted and anything unusable reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalRunReport {
    pub run_id: String,
    pub version_id: String,
    #[serde(deserialize_with = "lenient_number")]
    pub pass_rate: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub passed: i64,
    #[serde(deserialize_with = "lenient_count")]
    pub failed: i64,
    pub failures_summary: Vec<FailureItem>,
    #[serde(deserialize_with = "lenient_number")]
    pub oracle_confidence_used: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub runtime_ms: f64,
    pub log_id: String,
}

impl ExternalRunReport {
    /// First non-empty failure error, in report order
    pub fn first_error(&self) -> Option<&str> {
        self.failures_summary
            .iter()
            .filter_map(|failure| failure.error.as_deref())
            .find(|error| !error.is_empty())
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).unwrap_or(0.0))
}

/// Test counts truncate toward zero; `as` saturates out-of-range values.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).map_or(0, |n| n.trunc() as i64))
}

/// Strings pass through; other truthy values keep their JSON text so the
/// failure still classifies as an execution error.
fn lenient_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let error = match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s),
        Value::Number(ref n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    };
    Ok(error)
}
