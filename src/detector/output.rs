//! Classification snapshot returned for every ingested event

use serde::{Deserialize, Serialize};

use crate::models::constants::PSW_VERSION;

use super::chunk::PreChunkMetrics;
use super::config::PswConfig;

/// Working state of the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PswState {
    #[serde(rename = "In-PSW")]
    InPsw,
    #[serde(rename = "Flailing")]
    Flailing,
    #[serde(rename = "Stalling")]
    Stalling,
}

impl PswState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PswState::InPsw => "In-PSW",
            PswState::Flailing => "Flailing",
            PswState::Stalling => "Stalling",
        }
    }
}

impl std::fmt::Display for PswState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters and scores at the time of an output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PswMetrics {
    #[serde(rename = "S")]
    pub score: f64,
    #[serde(rename = "S_best")]
    pub best_score: f64,
    pub chunk_active_time: f64,
    pub chunk_runs: u32,
    pub chunk_max_idle: f64,
    pub chunk_edit_chars: f64,
    pub chunk_edit_events: u32,
    pub chunk_small_edit_events: u32,
    pub pre_chunk_active_time: Option<f64>,
    pub pre_chunk_runs: Option<u32>,
    pub pre_chunk_max_idle: Option<f64>,
    pub pre_chunk_edit_chars: Option<f64>,
    pub pre_chunk_small_edit_events: Option<u32>,
    pub last_run_ts: Option<f64>,
    pub last_activity_ts: Option<f64>,
}

impl PswMetrics {
    /// Fill the pre-chunk fields from a reset snapshot
    pub fn with_pre_chunk(mut self, pre: Option<&PreChunkMetrics>) -> Self {
        self.pre_chunk_active_time = pre.map(|p| p.active_time);
        self.pre_chunk_runs = pre.map(|p| p.runs);
        self.pre_chunk_max_idle = pre.map(|p| p.max_idle);
        self.pre_chunk_edit_chars = pre.map(|p| p.edit_chars);
        self.pre_chunk_small_edit_events = pre.map(|p| p.small_edit_events);
        self
    }

    /// Whether this output carries a pre-reset snapshot
    pub fn has_pre_chunk(&self) -> bool {
        self.pre_chunk_active_time.is_some()
    }
}

/// Thresholds in effect, plus the identity of the algorithm and config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PswThresholds {
    #[serde(flatten)]
    pub config: PswConfig,
    pub theta: Option<f64>,
    pub total_tests: Option<f64>,
    pub psw_version: String,
    pub config_hash: String,
}

impl PswThresholds {
    pub fn new(
        config: PswConfig,
        theta: Option<f64>,
        total_tests: Option<f64>,
        config_hash: String,
    ) -> Self {
        Self {
            config,
            theta,
            total_tests,
            psw_version: PSW_VERSION.to_string(),
            config_hash,
        }
    }
}

/// Result of ingesting one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PswOutput {
    pub state: PswState,
    pub metrics: PswMetrics,
    /// Diagnostic text for audit logs. Not meant to be parsed.
    pub reason: String,
    pub thresholds: PswThresholds,
}
