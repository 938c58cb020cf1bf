//! Test-run progress tracking.
//!
//! Keeps the pass ratio of the latest run and a best-score high-water mark.
//! A run whose gain in the high-water mark reaches `theta = 1 / total_tests`
//! (one more passing test) is significant progress and resets the chunk.

use super::chunk::{ChunkCounters, PreChunkMetrics};
use super::error::DetectorError;

/// Relative slack allowed when comparing the best-score gain against theta.
///
/// `3/10 - 2/10` is `0.09999999999999998` in binary floating point; without
/// slack a one-test improvement out of ten would not count.
const THETA_TOLERANCE: f64 = 1e-9;

/// Outcome of an event for the current chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkTransition {
    /// Significant progress: the chunk was reset, `pre` holds its last values
    Reset { pre: PreChunkMetrics },
    NoReset,
}

impl ChunkTransition {
    pub fn pre_chunk(&self) -> Option<&PreChunkMetrics> {
        match self {
            ChunkTransition::Reset { pre } => Some(pre),
            ChunkTransition::NoReset => None,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, ChunkTransition::Reset { .. })
    }
}

/// Score state across the whole session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressTracker {
    score: f64,
    best_score: f64,
    last_pabs: Option<f64>,
    last_theta: Option<f64>,
    last_total_tests: Option<f64>,
    last_run_ts: Option<f64>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass ratio of the most recent run (`S`)
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Best pass ratio seen this session (`S_best`); never decreases
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn last_pabs(&self) -> Option<f64> {
        self.last_pabs
    }

    pub fn last_theta(&self) -> Option<f64> {
        self.last_theta
    }

    pub fn last_total_tests(&self) -> Option<f64> {
        self.last_total_tests
    }

    pub fn last_run_ts(&self) -> Option<f64> {
        self.last_run_ts
    }

    /// Apply a test run at `ts`.
    ///
    /// A run with an unusable pass count or a non-positive total resets the
    /// ratio to zero, clears theta and returns `DegenerateTotalTests`. The run
    /// timestamp is recorded either way.
    pub fn apply_run(
        &mut self,
        ts: f64,
        pass_count: Option<f64>,
        total_tests: Option<f64>,
        chunk: &mut ChunkCounters,
    ) -> Result<ChunkTransition, DetectorError> {
        self.last_run_ts = Some(ts);

        let (pass, total) = match (pass_count, total_tests) {
            (Some(pass), Some(total)) if total > 0.0 => (pass, total),
            _ => {
                self.score = 0.0;
                self.last_pabs = Some(0.0);
                self.last_theta = None;
                self.last_total_tests = None;
                return Err(DetectorError::DegenerateTotalTests {
                    pass_count,
                    total_tests,
                });
            }
        };

        let score = pass / total;
        let previous_best = self.best_score;
        self.score = score;
        self.best_score = self.best_score.max(score);

        let theta = 1.0 / total;
        let pabs = (self.best_score - previous_best).max(0.0);
        self.last_pabs = Some(pabs);
        self.last_theta = Some(theta);
        self.last_total_tests = Some(total);

        if pabs >= theta * (1.0 - THETA_TOLERANCE) {
            Ok(ChunkTransition::Reset { pre: chunk.reset() })
        } else {
            chunk.record_unproductive_run();
            Ok(ChunkTransition::NoReset)
        }
    }
}
