//! One detector per session

use std::collections::HashMap;

use tracing::debug;

use crate::models::telemetry::TelemetryEvent;

use super::config::PswConfig;
use super::core::PswDetector;
use super::output::PswOutput;

/// Independent detectors keyed by session id.
///
/// Detectors share only the (immutable) config; no state crosses sessions.
#[derive(Debug, Clone)]
pub struct SessionDetectors {
    config: PswConfig,
    detectors: HashMap<String, PswDetector>,
}

impl SessionDetectors {
    pub fn new(config: PswConfig) -> Self {
        Self {
            config,
            detectors: HashMap::new(),
        }
    }

    /// Ingest an event for `session_id`, starting a detector on first sight
    pub fn ingest(&mut self, session_id: &str, event: &TelemetryEvent) -> PswOutput {
        let config = self.config;
        self.detectors
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "Starting detector for session");
                PswDetector::new(config)
            })
            .ingest(event)
    }

    /// Get the detector for a session
    pub fn get(&self, session_id: &str) -> Option<&PswDetector> {
        self.detectors.get(session_id)
    }

    /// Discard a session's detector. Returns whether it existed.
    pub fn end_session(&mut self, session_id: &str) -> bool {
        self.detectors.remove(session_id).is_some()
    }

    /// Session ids with a live detector, sorted
    pub fn session_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.detectors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
