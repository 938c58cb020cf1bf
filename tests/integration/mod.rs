//! Integration tests for the psw detector and evaluation pipeline
//!
//! These tests drive the public API end to end: replaying telemetry logs from
//! disk, property checks over random event streams, and the evaluation router
//! feeding mapped runs into a detector.

pub mod helpers;
mod evaluation;
mod properties;
mod replay_cases;
