//! State classification from chunk metrics.
//!
//! Decision order:
//! 1. a chunk reset on this event is always In-PSW
//! 2. chunks with active time at or below `T_ACTIVE_SECONDS` are In-PSW
//! 3. flailing signals win over stalling signals, which win over the default

use super::config::PswConfig;
use super::output::{PswMetrics, PswState};
use super::progress::ChunkTransition;

/// Which rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonTag {
    SignificantProgress,
    ActiveTimeWithinThreshold,
    RunsWithoutProgress,
    ManySmallEditsWithoutProgress,
    IdleAndFewRuns,
    NoRunsAndLowEdits,
    DefaultInPsw,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::SignificantProgress => "significant_progress",
            ReasonTag::ActiveTimeWithinThreshold => "active_time_within_threshold",
            ReasonTag::RunsWithoutProgress => "runs_without_progress",
            ReasonTag::ManySmallEditsWithoutProgress => "many_small_edits_without_progress",
            ReasonTag::IdleAndFewRuns => "idle_and_few_runs",
            ReasonTag::NoRunsAndLowEdits => "no_runs_and_low_edits",
            ReasonTag::DefaultInPsw => "default_in_psw",
        }
    }

    pub fn state(&self) -> PswState {
        match self {
            ReasonTag::RunsWithoutProgress | ReasonTag::ManySmallEditsWithoutProgress => {
                PswState::Flailing
            }
            ReasonTag::IdleAndFewRuns | ReasonTag::NoRunsAndLowEdits => PswState::Stalling,
            ReasonTag::SignificantProgress
            | ReasonTag::ActiveTimeWithinThreshold
            | ReasonTag::DefaultInPsw => PswState::InPsw,
        }
    }

    /// Leading text of the reason string
    fn prefix(&self) -> String {
        match self {
            ReasonTag::SignificantProgress => {
                "significant_progress(Pabs>=theta) sig_progress=true reset_chunk".to_string()
            }
            ReasonTag::ActiveTimeWithinThreshold => self.as_str().to_string(),
            _ => format!("{} over_threshold=true", self.as_str()),
        }
    }
}

impl std::fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level values reported alongside the chunk counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunDiagnostics {
    pub run_gap_seconds: Option<f64>,
    pub pabs: Option<f64>,
    pub theta: Option<f64>,
}

/// A classified state with its reason
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub state: PswState,
    pub tag: ReasonTag,
    pub reason: String,
}

/// Seconds from the last run to the last accepted event, if any run was seen
pub fn run_gap_seconds(last_event_ts: Option<f64>, last_run_ts: Option<f64>) -> Option<f64> {
    let last_run = last_run_ts?;
    let last_event = last_event_ts.unwrap_or(last_run);
    Some((last_event - last_run).max(0.0) / 1000.0)
}

/// Classify the current chunk
pub fn classify(
    metrics: &PswMetrics,
    diagnostics: &RunDiagnostics,
    config: &PswConfig,
    transition: &ChunkTransition,
) -> Classification {
    let tag = select_tag(metrics, diagnostics, config, transition);
    Classification {
        state: tag.state(),
        tag,
        reason: format!(
            "{} {}",
            tag.prefix(),
            diagnostic_suffix(metrics, diagnostics, config)
        ),
    }
}

fn select_tag(
    metrics: &PswMetrics,
    diagnostics: &RunDiagnostics,
    config: &PswConfig,
    transition: &ChunkTransition,
) -> ReasonTag {
    if transition.is_reset() {
        return ReasonTag::SignificantProgress;
    }

    if metrics.chunk_active_time <= config.t_active_seconds {
        return ReasonTag::ActiveTimeWithinThreshold;
    }

    let low_edits = metrics.chunk_edit_chars < config.min_char_change;
    let many_small_edits = metrics.chunk_edit_events >= config.min_edit_events && low_edits;
    let long_idle = metrics.chunk_max_idle >= config.idle_cutoff_seconds;
    let no_run_yet = metrics.last_run_ts.is_none();
    let long_run_gap = diagnostics
        .run_gap_seconds
        .is_some_and(|gap| gap >= config.run_gap_seconds);

    let flailing = metrics.chunk_runs >= config.flail_runs && !no_run_yet;
    let stalling =
        (long_idle && metrics.chunk_runs <= 1) || (low_edits && long_idle) || long_run_gap;

    // When both flailing signals hold, repeated runs take precedence.
    if flailing {
        ReasonTag::RunsWithoutProgress
    } else if many_small_edits {
        ReasonTag::ManySmallEditsWithoutProgress
    } else if stalling {
        ReasonTag::IdleAndFewRuns
    } else if no_run_yet && low_edits {
        ReasonTag::NoRunsAndLowEdits
    } else {
        ReasonTag::DefaultInPsw
    }
}

fn diagnostic_suffix(
    metrics: &PswMetrics,
    diagnostics: &RunDiagnostics,
    config: &PswConfig,
) -> String {
    format!(
        "chunk_active_time={:.1} chunk_runs={} chunk_max_idle={:.1} run_gap={} \
         small_edits={} Pabs={} theta={} T_active={}",
        round_tenths(metrics.chunk_active_time),
        metrics.chunk_runs,
        round_tenths(metrics.chunk_max_idle),
        format_optional(diagnostics.run_gap_seconds),
        metrics.chunk_small_edit_events,
        format_optional(diagnostics.pabs),
        format_optional(diagnostics.theta),
        config.t_active_seconds,
    )
}

/// Round half away from zero to one decimal, so `0.25` prints as `0.3`
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
