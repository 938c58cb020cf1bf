pub mod constants;
pub mod telemetry;

pub use telemetry::{EventKind, Signal, TelemetryEvent};
