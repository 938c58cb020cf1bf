//! Per-chunk counters and the edit/idle accumulators.
//!
//! A chunk is the window since the last significant-progress reset (or the
//! start of the session). Struggle signals are always judged against it.

use serde::{Deserialize, Serialize};

/// Counters accumulated over the current chunk
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChunkCounters {
    pub active_seconds: f64,
    pub runs: u32,
    pub max_idle_seconds: f64,
    pub edit_chars: f64,
    pub edit_events: u32,
    pub small_edit_events: u32,
}

/// Chunk counters captured just before a progress reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreChunkMetrics {
    pub active_time: f64,
    pub runs: u32,
    pub max_idle: f64,
    pub edit_chars: f64,
    pub small_edit_events: u32,
}

impl ChunkCounters {
    /// Record an edit. Every edit counts as an event; only a usable delta
    /// contributes characters or can count as small.
    pub fn record_edit(&mut self, delta_chars: Option<f64>, small_edit: f64) {
        if let Some(delta) = delta_chars {
            let magnitude = delta.abs();
            self.edit_chars += magnitude;
            if magnitude <= small_edit {
                self.small_edit_events += 1;
            }
        }
        self.edit_events += 1;
    }

    /// Raise the chunk's idle high-water mark
    pub fn record_idle(&mut self, idle_seconds: Option<f64>) {
        if let Some(idle) = idle_seconds {
            self.max_idle_seconds = self.max_idle_seconds.max(idle);
        }
    }

    /// Count a test run that did not produce significant progress
    pub fn record_unproductive_run(&mut self) {
        self.runs += 1;
    }

    /// Zero every counter and return what they held
    pub fn reset(&mut self) -> PreChunkMetrics {
        let previous = std::mem::take(self);
        PreChunkMetrics {
            active_time: previous.active_seconds,
            runs: previous.runs,
            max_idle: previous.max_idle_seconds,
            edit_chars: previous.edit_chars,
            small_edit_events: previous.small_edit_events,
        }
    }
}
