//! Command-line interface definitions.
//!
//! Defines the CLI structure for the racewatch application using `clap`:
//! tracking the live race, printing the season calendar and checking a
//! configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Live race status tracker
#[derive(Parser, Debug)]
#[command(name = "racewatch")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the racewatch CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track the active race until interrupted
    Run(RunArgs),

    /// Print the season calendar
    Schedule(ConfigArg),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `racewatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigArg),
}

/// Optional configuration path.
///
/// Without `--config`, `config.toml` is used when present and built-in
/// defaults otherwise.
#[derive(Parser, Debug)]
pub struct ConfigArg {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the log level (e.g. debug, info, warn).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Override the push channel URL.
    #[arg(long)]
    pub channel_url: Option<String>,

    /// Override the race server REST URL.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Skip the weather cycle.
    #[arg(long)]
    pub no_weather: bool,

    /// Skip the telemetry cycle.
    #[arg(long)]
    pub no_telemetry: bool,

    /// Automatic prediction refresh period in seconds (0 disables).
    #[arg(long)]
    pub refresh_secs: Option<u64>,
}
