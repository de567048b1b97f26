//! touchkit CLI - replay touch traces and check gesture configs.

#![allow(clippy::needless_pass_by_value, clippy::uninlined_format_args)]

mod replay;

use clap::{Parser, Subcommand};
use replay::{CliError, OutputFormat};
use std::path::{Path, PathBuf};
use touchkit_core::GestureConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "touchkit")]
#[command(about = "Multi-touch gesture recognition CLI")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded touch trace through the engine
    Replay {
        /// Trace file (YAML or JSON list of touch frames)
        trace: PathBuf,

        /// Gesture configuration (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Fire timers up to this time (default: last frame plus the longest delay)
        #[arg(long)]
        until: Option<u64>,
    },

    /// Validate a gesture configuration file
    CheckConfig {
        /// Path to config file
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Replay {
            trace,
            config,
            format,
            until,
        } => run_replay(&trace, config.as_ref(), format, until),
        Commands::CheckConfig { config } => run_check_config(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_replay(
    trace: &Path,
    config: Option<&PathBuf>,
    format: OutputFormat,
    until: Option<u64>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => GestureConfig::from_path(path)?,
        None => GestureConfig::default(),
    };
    let frames = replay::load_trace(trace)?;
    tracing::info!(frames = frames.len(), trace = %trace.display(), "replaying");

    let events = replay::replay(&frames, config, until);
    print!("{}", replay::render(&events, format)?);
    Ok(())
}

fn run_check_config(path: &Path) -> Result<(), CliError> {
    let report = replay::check_config(path)?;
    println!("Config valid: {}", path.display());
    print!("{}", report);
    Ok(())
}
