//! Replay a JSONL telemetry log through the detector

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::detector::{PswConfig, PswOutput, PswState, SessionDetectors, SustainTracker};
use crate::models::telemetry::TelemetryEvent;
use crate::settings::Settings;

/// Session used for lines without a `session_id`
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Colored one-line summary per event
    Text,
}

/// One line of a telemetry log
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(flatten)]
    event: TelemetryEvent,
}

/// Detector output for one replayed event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub line: usize,
    pub session_id: String,
    pub event: TelemetryEvent,
    pub output: PswOutput,
    /// The session's state differs from its previous step
    pub state_changed: bool,
    /// Flailing or Stalling has held for `PSW_SUSTAIN_SECONDS`
    pub badge: bool,
}

/// Replay every event in `reader`, one detector per session.
///
/// Blank lines are skipped and the first malformed line aborts the replay.
/// With `sort_by_ts` the events are stably ordered by timestamp first, so
/// logs written out of order replay as they happened.
pub fn replay<R: BufRead>(
    reader: R,
    config: PswConfig,
    sort_by_ts: bool,
) -> Result<Vec<ReplayStep>> {
    let mut records = read_records(reader)?;
    if sort_by_ts {
        records.sort_by(|(_, a), (_, b)| a.event.ts.total_cmp(&b.event.ts));
    }

    let sustain_seconds = config.psw_sustain_seconds;
    let mut sessions = SessionDetectors::new(config);
    let mut trackers: HashMap<String, SustainTracker> = HashMap::new();
    let steps = records
        .into_iter()
        .map(|(line, record)| {
            let session_id = record
                .session_id
                .unwrap_or_else(|| DEFAULT_SESSION.to_string());
            let output = sessions.ingest(&session_id, &record.event);
            let status = trackers
                .entry(session_id.clone())
                .or_insert_with(|| SustainTracker::new(sustain_seconds))
                .observe(record.event.ts, output.state);
            ReplayStep {
                line,
                session_id,
                event: record.event,
                output,
                state_changed: status.state_changed,
                badge: status.badge,
            }
        })
        .collect();

    Ok(steps)
}

fn read_records<R: BufRead>(reader: R) -> Result<Vec<(usize, ReplayRecord)>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(&line)
            .with_context(|| format!("Malformed telemetry on line {line_no}"))?;
        records.push((line_no, record));
    }
    Ok(records)
}

/// Replay a telemetry file (or stdin for `-`) and print each output
pub fn execute(
    input: &str,
    config_path: Option<&Path>,
    format: OutputFormat,
    sort_by_ts: bool,
) -> Result<()> {
    let settings = Settings::load_or_default(config_path)?;
    let reader = open_input(input)?;
    let steps = replay(reader, settings.thresholds, sort_by_ts)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for step in &steps {
        match format {
            OutputFormat::Json => {
                let line =
                    serde_json::to_string(step).context("Failed to serialize replay output")?;
                writeln!(out, "{line}")?;
            }
            OutputFormat::Text => writeln!(out, "{}", format_step(step))?,
        }
    }
    Ok(())
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input)
        .with_context(|| format!("Failed to open telemetry file: {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn format_step(step: &ReplayStep) -> String {
    let state = match step.output.state {
        PswState::InPsw => step.output.state.as_str().green(),
        PswState::Flailing => step.output.state.as_str().yellow(),
        PswState::Stalling => step.output.state.as_str().red(),
    };
    let marker = if step.badge {
        " [badge]".magenta().bold().to_string()
    } else if step.state_changed {
        " state_change".dimmed().to_string()
    } else {
        String::new()
    };
    format!(
        "{:>5} {} ts={} {:<14} {}{} S_best={:.3} {}",
        step.line,
        step.session_id.dimmed(),
        step.event.ts,
        step.event.kind,
        state.bold(),
        marker,
        step.output.metrics.best_score,
        step.output.reason
    )
}
