//! Shared helpers for integration tests

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use psw::detector::PswConfig;

/// Thresholds used by the recorded replay cases: defaults with a 10s floor
pub fn replay_config() -> PswConfig {
    PswConfig {
        t_active_seconds: 10.0,
        ..Default::default()
    }
}

/// Write JSON values as a JSONL telemetry log in a fresh temp dir
pub fn write_jsonl(lines: &[Value]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("session.jsonl");
    let content: String = lines.iter().map(|line| format!("{line}\n")).collect();
    fs::write(&path, content).expect("Failed to write telemetry log");
    (dir, path)
}
