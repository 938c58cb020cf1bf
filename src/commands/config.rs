//! Show the effective configuration

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::models::constants::PSW_VERSION;
use crate::settings::Settings;

/// Print effective thresholds, their canonical JSON and hash, and the
/// evaluation settings after environment overrides
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let mut settings = Settings::load_or_default(config_path)?;
    settings.apply_env();

    let thresholds = &settings.thresholds;

    println!("{}", "Thresholds".bold());
    for (key, value) in thresholds.entries() {
        println!("  {key:<22} {value}");
    }

    println!("\n{}", "Identity".bold());
    println!("  psw_version:    {PSW_VERSION}");
    println!("  config_hash:    {}", thresholds.config_hash().cyan());
    println!("  canonical_json: {}", thresholds.canonical_json().dimmed());

    let evaluation = &settings.evaluation;
    println!("\n{}", "Evaluation".bold());
    println!(
        "  source:         {}",
        if evaluation.use_external {
            "external"
        } else {
            "local"
        }
    );
    println!(
        "  version_id:     {}",
        evaluation.version_id.as_deref().unwrap_or("(unbound)")
    );
    println!("  base_url:       {}", evaluation.base_url);
    println!("  timeout_secs:   {}", evaluation.timeout_secs);
    Ok(())
}
