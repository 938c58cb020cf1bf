//! Property checks over random telemetry streams

use proptest::prelude::*;

use psw::detector::{PswConfig, PswDetector, PswState, INVALID_TS_REASON};
use psw::models::TelemetryEvent;

// ── Strategy helpers ──────────────────────────────────────────────────

/// A run with `pass_count <= total_tests`, or a degenerate one with no tests
fn arb_run() -> impl Strategy<Value = (i64, i64)> {
    prop_oneof![
        (1i64..=20).prop_flat_map(|total| (0..=total, Just(total))),
        Just((0, 0)),
    ]
}

/// Event factory taking the timestamp, so streams stay ordered
#[derive(Debug, Clone)]
enum Step {
    Edit(i64),
    Run(i64, i64),
    Program,
    Idle(f64),
}

impl Step {
    fn at(&self, ts: f64) -> TelemetryEvent {
        match *self {
            Step::Edit(delta) => TelemetryEvent::edit(ts, delta),
            Step::Run(pass, total) => TelemetryEvent::run_tests(ts, pass, total),
            Step::Program => TelemetryEvent::run_program(ts),
            Step::Idle(idle) => TelemetryEvent::idle_heartbeat(ts, idle),
        }
    }
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-200i64..=200).prop_map(Step::Edit),
        arb_run().prop_map(|(pass, total)| Step::Run(pass, total)),
        Just(Step::Program),
        (0.0f64..300.0).prop_map(Step::Idle),
    ]
}

/// Steps paired with non-negative gaps in milliseconds
fn arb_stream() -> impl Strategy<Value = Vec<(u32, Step)>> {
    prop::collection::vec((0u32..120_000, arb_step()), 1..60)
}

fn timed(stream: &[(u32, Step)]) -> Vec<TelemetryEvent> {
    let mut ts = 0.0;
    stream
        .iter()
        .map(|(gap, step)| {
            ts += f64::from(*gap);
            step.at(ts)
        })
        .collect()
}

proptest! {
    #[test]
    fn best_score_never_decreases(stream in arb_stream()) {
        let mut detector = PswDetector::new(PswConfig::default());
        let mut previous = 0.0;

        for event in timed(&stream) {
            let output = detector.ingest(&event);
            prop_assert!(output.metrics.best_score >= previous);
            prop_assert!((0.0..=1.0).contains(&output.metrics.best_score));
            previous = output.metrics.best_score;
        }
    }

    #[test]
    fn reset_clears_chunk_counters(stream in arb_stream()) {
        let mut detector = PswDetector::new(PswConfig::default());
        let mut after_reset = false;

        for event in timed(&stream) {
            let output = detector.ingest(&event);
            let metrics = &output.metrics;

            if after_reset {
                // Only this event's own contribution may be present
                prop_assert!(metrics.chunk_runs <= 1);
                prop_assert!(metrics.chunk_edit_events <= 1);
                prop_assert!(metrics.chunk_small_edit_events <= 1);
            }

            after_reset = metrics.has_pre_chunk();
            if after_reset {
                prop_assert!(output.reason.starts_with("significant_progress"));
                prop_assert_eq!(output.state, PswState::InPsw);
                prop_assert_eq!(metrics.chunk_active_time, 0.0);
                prop_assert_eq!(metrics.chunk_runs, 0);
                prop_assert_eq!(metrics.chunk_max_idle, 0.0);
                prop_assert_eq!(metrics.chunk_edit_chars, 0.0);
                prop_assert_eq!(metrics.chunk_edit_events, 0);
                prop_assert_eq!(metrics.chunk_small_edit_events, 0);
            }
        }
    }

    #[test]
    fn earlier_timestamp_is_rejected(
        first in 1.0f64..1e12,
        back in 0.001f64..1.0,
        step in arb_step(),
    ) {
        let mut detector = PswDetector::new(PswConfig::default());
        detector.ingest(&TelemetryEvent::run_program(first));
        let before = detector.metrics();

        let output = detector.ingest(&step.at(first * (1.0 - back)));

        prop_assert_eq!(output.reason.as_str(), INVALID_TS_REASON);
        prop_assert_eq!(output.state, PswState::InPsw);
        prop_assert_eq!(detector.metrics(), before);
    }

    #[test]
    fn replay_is_deterministic(stream in arb_stream()) {
        let events = timed(&stream);
        let mut first = PswDetector::new(PswConfig::default());
        let mut second = PswDetector::new(PswConfig::default());

        for event in &events {
            prop_assert_eq!(first.ingest(event), second.ingest(event));
        }
    }
}
