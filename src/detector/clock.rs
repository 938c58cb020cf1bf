//! Event ordering and active-time accounting

use super::error::DetectorError;

/// Tracks the last accepted timestamp of a session's event stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityClock {
    last_event_ts: Option<f64>,
}

impl ActivityClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last accepted event
    pub fn last_event_ts(&self) -> Option<f64> {
        self.last_event_ts
    }

    /// Accept `ts` and return the seconds of active time it contributes.
    ///
    /// Timestamps must be finite and non-decreasing; a rejected timestamp
    /// leaves the clock untouched. The elapsed gap counts as active only when
    /// the event's reported idle time is within `idle_cutoff_seconds`.
    pub fn advance(
        &mut self,
        ts: f64,
        idle_seconds: f64,
        idle_cutoff_seconds: f64,
    ) -> Result<f64, DetectorError> {
        if !ts.is_finite() {
            return Err(DetectorError::InvalidTimestamp {
                ts,
                last: self.last_event_ts,
            });
        }

        let mut active_seconds = 0.0;
        if let Some(last) = self.last_event_ts {
            if ts < last {
                return Err(DetectorError::InvalidTimestamp {
                    ts,
                    last: Some(last),
                });
            }
            if ts > last && idle_seconds <= idle_cutoff_seconds {
                active_seconds = (ts - last) / 1000.0;
            }
        }

        self.last_event_ts = Some(ts);
        Ok(active_seconds)
    }
}
