use anyhow::Result;
use clap::{Parser, Subcommand};
use psw::commands::evaluate::EvaluateOptions;
use psw::commands::replay::OutputFormat;
use psw::commands::{config, evaluate, map_run, replay};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "psw")]
#[command(about = "Productive-struggle window detector for coding sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log detector decisions at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL telemetry log and print the state after each event
    Replay {
        /// Telemetry file, or `-` for stdin
        input: String,

        /// Settings file (defaults to ./psw.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Order events by timestamp before replaying
        #[arg(long)]
        sort: bool,
    },

    /// Map an external evaluator report to a run_tests event
    MapRun {
        /// Report JSON file
        report: PathBuf,

        /// Event timestamp in epoch milliseconds (default: now)
        #[arg(long)]
        ts: Option<f64>,
    },

    /// Evaluate a test run locally or on the external evaluator
    Evaluate {
        /// Settings file (defaults to ./psw.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use the external evaluator
        #[arg(long)]
        external: bool,

        /// Oracle version to run against (empty unbinds)
        #[arg(long)]
        version_id: Option<String>,

        /// Base URL of the external evaluator
        #[arg(long)]
        oracle_url: Option<String>,

        /// Recorded run_tests event used for local evaluation
        #[arg(long)]
        local_event: Option<PathBuf>,

        /// Source file sent to the external evaluator
        #[arg(long)]
        code_file: Option<PathBuf>,

        /// Function the external evaluator calls (default: main)
        #[arg(long)]
        entrypoint: Option<String>,
    },

    /// Show effective thresholds and their hash
    Config {
        /// Settings file (defaults to ./psw.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            input,
            config,
            format,
            sort,
        } => replay::execute(&input, config.as_deref(), format, sort),
        Commands::MapRun { report, ts } => map_run::execute(&report, ts),
        Commands::Evaluate {
            config,
            external,
            version_id,
            oracle_url,
            local_event,
            code_file,
            entrypoint,
        } => evaluate::execute(EvaluateOptions {
            config,
            external,
            version_id,
            oracle_url,
            local_event,
            code_file,
            entrypoint,
        }),
        Commands::Config { config } => config::execute(config.as_deref()),
    }
}
