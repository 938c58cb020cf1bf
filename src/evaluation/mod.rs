//! Test-run evaluation: external reports, the adapter that turns them into
//! telemetry, and the router that picks an evaluator.

pub mod adapter;
pub mod client;
pub mod local;
pub mod report;
pub mod router;

pub use adapter::{classify_failure, map_run};
pub use client::{HttpOracleClient, RunRequest};
pub use local::RecordedRunEvaluator;
pub use report::{ExternalRunReport, FailureItem};
pub use router::{
    EvaluationError, EvaluationRouter, EvaluationSource, ExternalEvaluator, LocalEvaluator,
    RoutedEvent,
};
