//! Local evaluator backed by a recorded `run_tests` event

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::models::telemetry::{EventKind, TelemetryEvent};

use super::router::LocalEvaluator;

/// Replays a `run_tests` event saved as JSON by a local test runner
#[derive(Debug, Clone)]
pub struct RecordedRunEvaluator {
    path: PathBuf,
}

impl RecordedRunEvaluator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocalEvaluator for RecordedRunEvaluator {
    fn run_local(&mut self) -> Result<TelemetryEvent> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read local run from {}", self.path.display()))?;
        let event: TelemetryEvent = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse local run in {}", self.path.display()))?;

        if event.kind != EventKind::RunTests {
            bail!(
                "Local run in {} is a '{}' event, expected 'run_tests'",
                self.path.display(),
                event.kind
            );
        }
        Ok(event)
    }
}
