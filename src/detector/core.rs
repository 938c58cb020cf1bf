//! Core detector implementation

use tracing::{debug, warn};

use crate::models::telemetry::{Signal, TelemetryEvent};

use super::chunk::ChunkCounters;
use super::classifier::{classify, run_gap_seconds, RunDiagnostics};
use super::clock::ActivityClock;
use super::config::PswConfig;
use super::output::{PswMetrics, PswOutput, PswState, PswThresholds};
use super::progress::{ChunkTransition, ProgressTracker};

/// Reason reported for events whose timestamp was rejected
pub const INVALID_TS_REASON: &str = "invalid_or_out_of_order_ts";

/// Classifies one session's telemetry stream.
///
/// Feed events in timestamp order through [`PswDetector::ingest`]. The detector
/// does no I/O and never fails: anomalies are logged and reported in the
/// returned output. Each session needs its own instance.
#[derive(Debug, Clone)]
pub struct PswDetector {
    config: PswConfig,
    config_hash: String,
    clock: ActivityClock,
    chunk: ChunkCounters,
    progress: ProgressTracker,
    last_activity_ts: Option<f64>,
}

impl PswDetector {
    pub fn new(config: PswConfig) -> Self {
        Self {
            config_hash: config.config_hash(),
            config,
            clock: ActivityClock::new(),
            chunk: ChunkCounters::default(),
            progress: ProgressTracker::new(),
            last_activity_ts: None,
        }
    }

    pub fn config(&self) -> &PswConfig {
        &self.config
    }

    /// Best pass ratio seen so far
    pub fn best_score(&self) -> f64 {
        self.progress.best_score()
    }

    /// Timestamp of the last accepted event
    pub fn last_event_ts(&self) -> Option<f64> {
        self.clock.last_event_ts()
    }

    /// Ingest one event and classify the session
    pub fn ingest(&mut self, event: &TelemetryEvent) -> PswOutput {
        let signal = event.signal();

        match self.clock.advance(
            event.ts,
            signal.reported_idle_seconds(),
            self.config.idle_cutoff_seconds,
        ) {
            Ok(active_seconds) => self.chunk.active_seconds += active_seconds,
            Err(err) => {
                warn!(kind = %event.kind, "Dropping event timing: {err}");
                return self.rejected_output();
            }
        }

        let transition = self.apply(event.ts, signal);
        if let ChunkTransition::Reset { pre } = &transition {
            debug!(
                ts = event.ts,
                best_score = self.progress.best_score(),
                pre_chunk_runs = pre.runs,
                pre_chunk_active_time = pre.active_time,
                "Significant progress, chunk reset"
            );
        }

        self.classified_output(&transition)
    }

    /// Current metrics without classifying
    pub fn metrics(&self) -> PswMetrics {
        PswMetrics {
            score: self.progress.score(),
            best_score: self.progress.best_score(),
            chunk_active_time: self.chunk.active_seconds,
            chunk_runs: self.chunk.runs,
            chunk_max_idle: self.chunk.max_idle_seconds,
            chunk_edit_chars: self.chunk.edit_chars,
            chunk_edit_events: self.chunk.edit_events,
            chunk_small_edit_events: self.chunk.small_edit_events,
            pre_chunk_active_time: None,
            pre_chunk_runs: None,
            pre_chunk_max_idle: None,
            pre_chunk_edit_chars: None,
            pre_chunk_small_edit_events: None,
            last_run_ts: self.progress.last_run_ts(),
            last_activity_ts: self.last_activity_ts,
        }
    }

    fn apply(&mut self, ts: f64, signal: Signal) -> ChunkTransition {
        match signal {
            Signal::RunTests {
                pass_count,
                total_tests,
            } => {
                self.last_activity_ts = Some(ts);
                match self
                    .progress
                    .apply_run(ts, pass_count, total_tests, &mut self.chunk)
                {
                    Ok(transition) => transition,
                    Err(err) => {
                        debug!(ts, "Treating run as non-progressing: {err}");
                        ChunkTransition::NoReset
                    }
                }
            }
            Signal::Edit { delta_chars } => {
                self.chunk.record_edit(delta_chars, self.config.small_edit);
                self.last_activity_ts = Some(ts);
                ChunkTransition::NoReset
            }
            Signal::RunProgram => {
                self.last_activity_ts = Some(ts);
                ChunkTransition::NoReset
            }
            Signal::IdleHeartbeat { idle_seconds } => {
                self.chunk.record_idle(idle_seconds);
                ChunkTransition::NoReset
            }
        }
    }

    fn thresholds(&self) -> PswThresholds {
        PswThresholds::new(
            self.config,
            self.progress.last_theta(),
            self.progress.last_total_tests(),
            self.config_hash.clone(),
        )
    }

    fn classified_output(&self, transition: &ChunkTransition) -> PswOutput {
        let metrics = self.metrics().with_pre_chunk(transition.pre_chunk());
        let diagnostics = RunDiagnostics {
            run_gap_seconds: run_gap_seconds(self.clock.last_event_ts(), metrics.last_run_ts),
            pabs: self.progress.last_pabs(),
            theta: self.progress.last_theta(),
        };
        let classification = classify(&metrics, &diagnostics, &self.config, transition);

        PswOutput {
            state: classification.state,
            metrics,
            reason: classification.reason,
            thresholds: self.thresholds(),
        }
    }

    fn rejected_output(&self) -> PswOutput {
        PswOutput {
            state: PswState::InPsw,
            metrics: self.metrics(),
            reason: INVALID_TS_REASON.to_string(),
            thresholds: self.thresholds(),
        }
    }
}
