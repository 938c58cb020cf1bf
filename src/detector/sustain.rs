//! Sustained-state badge
//!
//! A Flailing or Stalling state only earns a badge once it has held for
//! `PSW_SUSTAIN_SECONDS`. The window restarts whenever the state changes.

use super::output::PswState;

/// Result of observing one detector output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SustainStatus {
    /// The state differs from the previous observation (or is the first one)
    pub state_changed: bool,
    /// The state is Flailing or Stalling and has held for the sustain window
    pub badge: bool,
}

/// Per-session tracker of how long the current state has held
#[derive(Debug, Clone, PartialEq)]
pub struct SustainTracker {
    sustain_ms: f64,
    state: Option<PswState>,
    since_ts: Option<f64>,
}

impl SustainTracker {
    pub fn new(sustain_seconds: f64) -> Self {
        Self {
            sustain_ms: sustain_seconds * 1000.0,
            state: None,
            since_ts: None,
        }
    }

    /// State currently being held
    pub fn state(&self) -> Option<PswState> {
        self.state
    }

    /// Record the state reported at `ts`.
    ///
    /// Non-finite timestamps never earn a badge and never start a window.
    pub fn observe(&mut self, ts: f64, state: PswState) -> SustainStatus {
        let state_changed = self.state != Some(state);
        if state_changed {
            self.state = Some(state);
            self.since_ts = ts.is_finite().then_some(ts);
        } else if self.since_ts.is_none() && ts.is_finite() {
            self.since_ts = Some(ts);
        }

        let badge = matches!(state, PswState::Flailing | PswState::Stalling)
            && ts.is_finite()
            && self
                .since_ts
                .is_some_and(|since| ts - since >= self.sustain_ms);

        SustainStatus {
            state_changed,
            badge,
        }
    }
}
