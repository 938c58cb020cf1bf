//! Productive-struggle window detector.
//!
//! Turns a session's telemetry stream (edits, test runs, idle heartbeats)
//! into one of three working states: In-PSW, Flailing or Stalling. The
//! detector is a pure state machine; replaying the same events yields the
//! same outputs.

pub mod chunk;
pub mod classifier;
pub mod clock;
mod config;
pub mod core;
mod error;
mod output;
pub mod progress;
mod registry;
pub mod sustain;


pub use classifier::{Classification, ReasonTag};
pub use config::PswConfig;
pub use self::core::{PswDetector, INVALID_TS_REASON};
pub use error::{ConfigError, DetectorError};
pub use output::{PswMetrics, PswOutput, PswState, PswThresholds};
pub use progress::ChunkTransition;
pub use registry::SessionDetectors;
pub use sustain::{SustainStatus, SustainTracker};
