//! Blocking HTTP client for the external test evaluator

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::report::ExternalRunReport;
use super::router::ExternalEvaluator;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Body of a run request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub entrypoint: String,
    pub code_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_file_path: Option<String>,
    pub timeout_sec: u64,
}

/// Runs a learner's code on the evaluator at
/// `POST {base_url}/oracle/version/{version_id}/run`.
#[derive(Debug, Clone)]
pub struct HttpOracleClient {
    client: Client,
    base_url: String,
    request: RunRequest,
}

impl HttpOracleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .user_agent(concat!("psw/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request: RunRequest {
                entrypoint: "main".to_string(),
                timeout_sec: timeout.as_secs(),
                ..Default::default()
            },
        })
    }

    /// Set the code and entrypoint sent with each run
    pub fn with_request(mut self, request: RunRequest) -> Self {
        self.request = request;
        self
    }

    pub fn run_url(&self, version_id: &str) -> String {
        format!("{}/oracle/version/{}/run", self.base_url, version_id)
    }
}

impl ExternalEvaluator for HttpOracleClient {
    fn run_external(&mut self, version_id: &str) -> Result<ExternalRunReport> {
        let url = self.run_url(version_id);
        debug!(%url, "Requesting external run");

        let response = self
            .client
            .post(&url)
            .json(&self.request)
            .send()
            .with_context(|| format!("Failed to reach evaluator at {url}"))?
            .error_for_status()
            .with_context(|| format!("Evaluator rejected run for version '{version_id}'"))?;

        response
            .json::<ExternalRunReport>()
            .context("Failed to parse evaluator run report")
    }
}
