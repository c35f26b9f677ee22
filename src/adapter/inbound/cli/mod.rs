//! CLI module graph.

pub mod check;
pub mod command;
pub mod output;
pub mod run;
pub mod schedule;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

use self::command::{CheckCommand, Cli, ColorChoice, Commands, DEFAULT_CONFIG};

/// File the config is read from: the explicit path, else `config.toml` when
/// it exists, else none.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            default.exists().then(|| default.to_path_buf())
        }
    }
}

/// Load the config for a command. Without a file the built-in defaults are
/// used (the environment is still consulted for secrets).
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match resolve_config_path(explicit) {
        Some(path) => Config::load(path),
        None => Config::parse_toml(""),
    }
}

/// Apply global flags and dispatch to the selected command.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Schedule(args) => schedule::execute(&args),
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/racewatch.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[clock]\ntick_ms = 250").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.clock.tick_ms, 250);
        assert_eq!(
            resolve_config_path(Some(file.path())),
            Some(file.path().to_path_buf())
        );
    }
}
