//! Chooses between local and external evaluation of a learner's code

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::telemetry::TelemetryEvent;

use super::adapter::map_run;
use super::report::ExternalRunReport;

/// Produces a `run_tests` event by running tests locally
pub trait LocalEvaluator {
    fn run_local(&mut self) -> anyhow::Result<TelemetryEvent>;
}

/// Runs code against an external evaluator pinned to a version
pub trait ExternalEvaluator {
    fn run_external(&mut self, version_id: &str) -> anyhow::Result<ExternalRunReport>;
}

impl<F> LocalEvaluator for F
where
    F: FnMut() -> anyhow::Result<TelemetryEvent>,
{
    fn run_local(&mut self) -> anyhow::Result<TelemetryEvent> {
        self()
    }
}

impl<F> ExternalEvaluator for F
where
    F: FnMut(&str) -> anyhow::Result<ExternalRunReport>,
{
    fn run_external(&mut self, version_id: &str) -> anyhow::Result<ExternalRunReport> {
        self(version_id)
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("External evaluation selected but no oracle version is bound")]
    OracleVersionMissing,

    #[error("Local evaluation failed")]
    Local(#[source] anyhow::Error),

    #[error("External evaluation of version '{version_id}' failed")]
    External {
        version_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Which evaluator produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationSource {
    Local,
    External,
}

impl std::fmt::Display for EvaluationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationSource::Local => write!(f, "local"),
            EvaluationSource::External => write!(f, "external"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedEvent {
    pub source: EvaluationSource,
    pub event: TelemetryEvent,
}

type Clock = Box<dyn Fn() -> f64 + Send + Sync>;

/// Routes a test run to the local or external evaluator.
///
/// External runs are stamped with the router's clock (epoch milliseconds by
/// default) and mapped through [`map_run`]. Local events pass through as-is.
pub struct EvaluationRouter {
    use_external: bool,
    version_id: Option<String>,
    clock: Clock,
}

impl EvaluationRouter {
    pub fn new(use_external: bool, version_id: Option<String>) -> Self {
        let mut router = Self {
            use_external,
            version_id: None,
            clock: Box::new(now_millis),
        };
        router.bind_version(version_id);
        router
    }

    /// Replace the clock used to timestamp external runs
    pub fn with_clock(mut self, clock: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn use_external(&self) -> bool {
        self.use_external
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// Bind the oracle version for external runs. An empty id unbinds.
    pub fn bind_version(&mut self, version_id: Option<String>) {
        self.version_id = version_id.filter(|id| !id.is_empty());
    }

    pub fn route(
        &self,
        local: &mut dyn LocalEvaluator,
        external: &mut dyn ExternalEvaluator,
    ) -> Result<RoutedEvent, EvaluationError> {
        if !self.use_external {
            info!(source = %EvaluationSource::Local, "Routing test run");
            let event = local.run_local().map_err(EvaluationError::Local)?;
            return Ok(RoutedEvent {
                source: EvaluationSource::Local,
                event,
            });
        }

        let Some(version_id) = self.version_id.as_deref() else {
            warn!("External evaluation requested without a bound oracle version");
            return Err(EvaluationError::OracleVersionMissing);
        };

        info!(source = %EvaluationSource::External, version_id, "Routing test run");
        let report =
            external
                .run_external(version_id)
                .map_err(|source| EvaluationError::External {
                    version_id: version_id.to_string(),
                    source,
                })?;

        Ok(RoutedEvent {
            source: EvaluationSource::External,
            event: map_run(&report, (self.clock)()),
        })
    }
}

impl std::fmt::Debug for EvaluationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationRouter")
            .field("use_external", &self.use_external)
            .field("version_id", &self.version_id)
            .finish_non_exhaustive()
    }
}

fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}
