//! Application settings loaded from `psw.toml` and the environment

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::detector::PswConfig;
use crate::models::constants::env;

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "psw.toml";

pub const DEFAULT_ORACLE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub thresholds: PswConfig,
    pub evaluation: EvaluationSettings,
}

/// How test runs are evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Route test runs to the external evaluator
    pub use_external: bool,
    /// Oracle version pinned for external runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            use_external: false,
            version_id: None,
            base_url: DEFAULT_ORACLE_URL.to_string(),
            timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    /// Load from `path` if given, else from `psw.toml` in the working
    /// directory when present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_SETTINGS_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.evaluation.timeout_secs == 0 {
            bail!("evaluation.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Apply overrides from a variable lookup.
    ///
    /// An empty version id unbinds the version. An empty URL is ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flag) = lookup(env::ORACLE_AS_RUN_TESTS) {
            self.evaluation.use_external = parse_flag(&flag);
        }
        if let Some(version_id) = lookup(env::ORACLE_VERSION_ID) {
            self.evaluation.version_id = Some(version_id).filter(|id| !id.is_empty());
        }
        if let Some(url) = lookup(env::ORACLE_URL).filter(|url| !url.is_empty()) {
            self.evaluation.base_url = url;
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

/// `"true"` in any case enables a flag; anything else disables it
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
