//! Thresholds for the detector

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::constants::{
    DEFAULT_FLAIL_RUNS, DEFAULT_IDLE_CUTOFF_SECONDS, DEFAULT_MIN_CHAR_CHANGE,
    DEFAULT_MIN_EDIT_EVENTS, DEFAULT_PSW_SUSTAIN_SECONDS, DEFAULT_RUN_GAP_SECONDS,
    DEFAULT_SMALL_EDIT, DEFAULT_T_ACTIVE_SECONDS,
};
use crate::models::telemetry::json_number;

use super::error::ConfigError;

/// Tuning constants bound to a detector at construction.
///
/// Serialized with the upper-case names used on the wire and in config files.
/// Missing keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct PswConfig {
    pub idle_cutoff_seconds: f64,
    pub t_active_seconds: f64,
    pub run_gap_seconds: f64,
    pub flail_runs: u32,
    pub min_char_change: f64,
    pub min_edit_events: u32,
    pub small_edit: f64,
    pub psw_sustain_seconds: f64,
}

impl Default for PswConfig {
    fn default() -> Self {
        Self {
            idle_cutoff_seconds: DEFAULT_IDLE_CUTOFF_SECONDS,
            t_active_seconds: DEFAULT_T_ACTIVE_SECONDS,
            run_gap_seconds: DEFAULT_RUN_GAP_SECONDS,
            flail_runs: DEFAULT_FLAIL_RUNS,
            min_char_change: DEFAULT_MIN_CHAR_CHANGE,
            min_edit_events: DEFAULT_MIN_EDIT_EVENTS,
            small_edit: DEFAULT_SMALL_EDIT,
            psw_sustain_seconds: DEFAULT_PSW_SUSTAIN_SECONDS,
        }
    }
}

impl PswConfig {
    /// All thresholds as `(wire name, value)` pairs
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("IDLE_CUTOFF_SECONDS", self.idle_cutoff_seconds),
            ("T_ACTIVE_SECONDS", self.t_active_seconds),
            ("RUN_GAP_SECONDS", self.run_gap_seconds),
            ("FLAIL_RUNS", f64::from(self.flail_runs)),
            ("MIN_CHAR_CHANGE", self.min_char_change),
            ("MIN_EDIT_EVENTS", f64::from(self.min_edit_events)),
            ("SMALL_EDIT", self.small_edit),
            ("PSW_SUSTAIN_SECONDS", self.psw_sustain_seconds),
        ]
    }

    /// Check that every threshold is a positive finite number
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { key, value });
            }
        }
        Ok(())
    }

    /// Serialize the thresholds as JSON with keys in sorted order.
    ///
    /// Integral values print without a fractional part, so the output is the
    /// same whether a value was written as `60` or `60.0`.
    pub fn canonical_json(&self) -> String {
        let sorted: BTreeMap<&'static str, Value> = self
            .entries()
            .into_iter()
            .map(|(key, value)| (key, json_number(value)))
            .collect();
        // A map of strings to numbers always serializes.
        serde_json::to_string(&sorted).unwrap_or_default()
    }

    /// Stable identity of these thresholds: first 16 hex chars of the
    /// SHA-256 of [`Self::canonical_json`]
    pub fn config_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_json().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}
