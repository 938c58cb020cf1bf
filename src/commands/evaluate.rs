//! Run one test evaluation through the router

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::evaluation::{
    EvaluationRouter, HttpOracleClient, LocalEvaluator, RecordedRunEvaluator, RunRequest,
};
use crate::models::telemetry::TelemetryEvent;
use crate::settings::Settings;

/// Command-line inputs for `psw evaluate`
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    pub config: Option<PathBuf>,
    pub external: bool,
    pub version_id: Option<String>,
    pub oracle_url: Option<String>,
    pub local_event: Option<PathBuf>,
    pub code_file: Option<PathBuf>,
    pub entrypoint: Option<String>,
}

/// Evaluate once and print `{source, event}` as JSON.
///
/// Settings come from the settings file, then the environment, then flags.
pub fn execute(options: EvaluateOptions) -> Result<()> {
    let settings = resolve_settings(&options)?;
    let evaluation = &settings.evaluation;

    let router = EvaluationRouter::new(evaluation.use_external, evaluation.version_id.clone());

    let mut local: Box<dyn LocalEvaluator> = match &options.local_event {
        Some(path) => Box::new(RecordedRunEvaluator::new(path)),
        None => Box::new(|| -> Result<TelemetryEvent> {
            bail!("No local run available; pass --local-event <FILE>")
        }),
    };

    let mut external = HttpOracleClient::new(
        &evaluation.base_url,
        Duration::from_secs(evaluation.timeout_secs),
    )?
    .with_request(build_request(&options, evaluation.timeout_secs)?);

    let routed = router.route(local.as_mut(), &mut external)?;

    let json = serde_json::to_string_pretty(&routed).context("Failed to serialize event")?;
    println!("{json}");
    Ok(())
}

fn resolve_settings(options: &EvaluateOptions) -> Result<Settings> {
    let mut settings = Settings::load_or_default(options.config.as_deref())?;
    settings.apply_env();

    if options.external {
        settings.evaluation.use_external = true;
    }
    if let Some(version_id) = &options.version_id {
        settings.evaluation.version_id = Some(version_id.clone()).filter(|id| !id.is_empty());
    }
    if let Some(url) = &options.oracle_url {
        settings.evaluation.base_url = url.clone();
    }
    Ok(settings)
}

fn build_request(options: &EvaluateOptions, timeout_secs: u64) -> Result<RunRequest> {
    let code_text = match &options.code_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read code file: {}", path.display()))?,
        None => String::new(),
    };

    Ok(RunRequest {
        entrypoint: options
            .entrypoint
            .clone()
            .unwrap_or_else(|| "main".to_string()),
        code_text,
        current_file_path: options
            .code_file
            .as_ref()
            .map(|path| path.display().to_string()),
        timeout_sec: timeout_secs,
    })
}
