//! Recorded telemetry logs replayed from disk

use std::fs::File;
use std::io::BufReader;

use serde_json::json;

use psw::commands::replay::{replay, ReplayStep};
use psw::detector::PswState;

use super::helpers::{replay_config, write_jsonl};

fn replay_file(lines: &[serde_json::Value]) -> Vec<ReplayStep> {
    let (_dir, path) = write_jsonl(lines);
    let file = File::open(&path).expect("Failed to open telemetry log");
    replay(BufReader::new(file), replay_config(), false).expect("Replay failed")
}

#[test]
fn test_pass_count_improvement_resets_chunk() {
    let steps = replay_file(&[
        json!({"ts": 1000, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 5, "duration_ms": 100}}),
        json!({"ts": 2000, "type": "run_tests", "payload": {"pass_count": 1, "total_tests": 5, "duration_ms": 100}}),
    ]);

    let last = &steps[1].output;
    assert_eq!(last.state, PswState::InPsw);
    assert_eq!(last.metrics.chunk_runs, 0);
    assert!(last.reason.contains("significant_progress"));
    assert_eq!(last.metrics.pre_chunk_runs, Some(1));
    assert_eq!(last.metrics.pre_chunk_active_time, Some(1.0));
}

#[test]
fn test_repeated_failing_runs_flail() {
    let steps = replay_file(&[
        json!({"ts": 0, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2, "duration_ms": 100}}),
        json!({"ts": 6000, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2, "duration_ms": 100}}),
        json!({"ts": 12000, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2, "duration_ms": 100}}),
    ]);

    let last = &steps[2].output;
    assert!(last.metrics.chunk_active_time > 10.0);
    assert_eq!(last.state, PswState::Flailing);
    assert!(last.reason.contains("runs_without_progress"));
    assert!(last.reason.contains("chunk_runs=3"));
}

#[test]
fn test_long_idle_with_few_runs_stalls() {
    let steps = replay_file(&[
        json!({"ts": 0, "type": "edit", "payload": {"delta_chars": 5}}),
        json!({"ts": 12000, "type": "idle_heartbeat", "payload": {"idle_seconds_since_last_activity": 10}}),
        json!({"ts": 13000, "type": "idle_heartbeat", "payload": {"idle_seconds_since_last_activity": 70}}),
    ]);

    let last = &steps[2].output;
    assert_eq!(last.state, PswState::Stalling);
    assert!(last.reason.contains("idle"));
    assert!(last.reason.contains("chunk_max_idle"));
}

#[test]
fn test_batch_logger_lines_replay_per_session() {
    let steps = replay_file(&[
        json!({"session_id": "s1", "ts": 0, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2}}),
        json!({"session_id": "s2", "ts": 0, "type": "edit", "payload": {"delta_chars": 40}}),
        json!({"session_id": "s1", "ts": 6000, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2}}),
        json!({"session_id": "s2", "ts": 30000, "type": "run_tests", "payload": {"pass_count": 2, "total_tests": 2}}),
        json!({"session_id": "s1", "ts": 12000, "type": "run_tests", "payload": {"pass_count": 0, "total_tests": 2}}),
    ]);

    let s1_last = &steps[4].output;
    assert_eq!(steps[4].session_id, "s1");
    assert_eq!(s1_last.state, PswState::Flailing);
    assert_eq!(s1_last.metrics.best_score, 0.0);

    let s2_last = &steps[3].output;
    assert_eq!(s2_last.metrics.best_score, 1.0);
    assert!(s2_last.reason.starts_with("significant_progress"));
}

#[test]
fn test_output_carries_threshold_identity() {
    let steps = replay_file(&[
        json!({"ts": 0, "type": "run_tests", "payload": {"pass_count": 1, "total_tests": 4}}),
    ]);

    let thresholds = &steps[0].output.thresholds;
    assert_eq!(thresholds.psw_version, "1.0.0");
    assert_eq!(thresholds.config_hash, replay_config().config_hash());
    assert_eq!(thresholds.theta, Some(0.25));
    assert_eq!(thresholds.total_tests, Some(4.0));

    let wire = serde_json::to_value(&steps[0]).unwrap();
    assert_eq!(wire["output"]["thresholds"]["T_ACTIVE_SECONDS"], json!(10.0));
    assert_eq!(wire["output"]["state"], json!("In-PSW"));
    assert_eq!(wire["session_id"], json!("default"));
}
