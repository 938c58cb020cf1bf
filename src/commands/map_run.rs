//! Map an external evaluator report to a `run_tests` event

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::evaluation::{map_run, ExternalRunReport};

/// Print the telemetry event for a saved report.
///
/// `ts` defaults to the current time in epoch milliseconds.
pub fn execute(report_path: &Path, ts: Option<f64>) -> Result<()> {
    let content = fs::read_to_string(report_path)
        .with_context(|| format!("Failed to read report: {}", report_path.display()))?;
    let report: ExternalRunReport = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse report: {}", report_path.display()))?;

    let ts = ts.unwrap_or_else(|| Utc::now().timestamp_millis() as f64);
    let event = map_run(&report, ts);

    let json = serde_json::to_string_pretty(&event).context("Failed to serialize event")?;
    println!("{json}");
    Ok(())
}
