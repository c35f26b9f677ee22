//! Handler for the `run` command.

use serde_json::json;
use tokio::sync::watch;
use tracing::info;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{load_config, output};
use crate::domain::{RaceState, RaceStatus, TimeRemaining};
use crate::error::Result;
use crate::infrastructure::bootstrap::{Collaborators, ConsoleMode};
use crate::infrastructure::config::logging::LogFormat;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::Services;
use crate::port::RaceView;

/// Execute the run command.
///
/// Prints one status line per committed change until Ctrl-C.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args, output::is_json());
    config.validate()?;
    config.init_logging();

    print_startup(&config);

    let console = if output::is_json() {
        ConsoleMode::Json
    } else if output::is_quiet() {
        ConsoleMode::Off
    } else {
        ConsoleMode::Text
    };
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let collaborators = Collaborators::from_config(&config, console)?;
    let services = Services::start(&config, collaborators, &shutdown_rx)?;
    let handle = services.handle.clone();
    let mut updates = handle.subscribe();

    let initial = updates.borrow_and_update().clone();
    print_state(&initial, handle.countdown())?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Shutdown signal received");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_state(&state, handle.countdown())?;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    services.join().await;
    output::note("racewatch stopped");
    Ok(())
}

/// Fold command-line overrides into the loaded config.
pub(crate) fn apply_overrides(config: &mut Config, args: &RunArgs, json_output: bool) {
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || json_output {
        config.logging.format = LogFormat::Json;
    }
    if let Some(url) = &args.channel_url {
        config.channel.url.clone_from(url);
    }
    if let Some(url) = &args.api_url {
        config.api.url.clone_from(url);
    }
    if args.no_weather {
        config.weather.enabled = false;
    }
    if args.no_telemetry {
        config.telemetry.enabled = false;
    }
    if let Some(secs) = args.refresh_secs {
        config.predictions.auto_refresh_secs = secs;
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Channel", &config.channel.url);
    output::field("API", &config.api.url);
    let weather = if config.weather.active_key().is_some() {
        "enabled"
    } else {
        "disabled"
    };
    output::field("Weather", weather);
    output::field("Telemetry", if config.telemetry.enabled { "enabled" } else { "disabled" });
    if output::verbosity() > 0 {
        output::field("Rounds", config.schedule.len());
        output::field("Tick", format!("{} ms", config.clock.tick_ms));
    }
}

fn print_state(state: &RaceState, remaining: TimeRemaining) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "type": "state",
            "payload": serde_json::to_value(state)?,
        }));
        return Ok(());
    }

    let status = match state.status {
        RaceStatus::Upcoming => output::highlight(state.status),
        RaceStatus::Live => output::negative(state.status),
        RaceStatus::Finished => output::muted(state.status),
    };
    output::info(
        &state.last_update.format("%H:%M:%S").to_string(),
        &status,
        &summary(state, remaining),
    );
    Ok(())
}

/// One-line description of a committed state, without colors.
pub(crate) fn summary(state: &RaceState, remaining: TimeRemaining) -> String {
    let event = &state.active_event;
    let mut parts = vec![format!("R{} {}", event.id(), event.name())];

    match state.status {
        RaceStatus::Upcoming => parts.push(format!("starts in {remaining}")),
        RaceStatus::Live => {
            if let Some(lap) = state.telemetry.and_then(|laps| laps.leader_lap) {
                parts.push(format!("lap {lap}"));
            }
        }
        RaceStatus::Finished => {}
    }

    parts.push(format!("push {}", state.connection));

    if let Some(weather) = &state.weather {
        parts.push(format!(
            "{:.1}°C {}",
            weather.temperature, weather.description
        ));
    }

    if let Some(leader) = state.predictions.leader() {
        parts.push(format!(
            "{} leads ({:.1}%)",
            leader.driver(),
            leader.win_probability()
        ));
    }

    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::command::{Cli, Commands};
    use crate::domain::{ConnectionHealth, LapSummary, PredictionInputs};
    use crate::testkit::domain as fixtures;
    use chrono::Duration;
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["racewatch", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    fn state() -> RaceState {
        let start = fixtures::round_nine_start();
        RaceState::initial(
            &fixtures::catalog(),
            start - Duration::seconds(90),
            fixtures::session(),
            PredictionInputs::default(),
        )
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = run_args(&[
            "--log-level",
            "debug",
            "--no-telemetry",
            "--api-url",
            "http://race.example",
            "--refresh-secs",
            "0",
        ]);
        apply_overrides(&mut config, &args, false);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.telemetry.enabled);
        assert!(config.weather.enabled);
        assert_eq!(config.api.url, "http://race.example");
        assert_eq!(config.predictions.auto_refresh(), None);
    }

    #[test]
    fn json_output_forces_json_logs() {
        let mut config = Config::default();
        apply_overrides(&mut config, &run_args(&[]), true);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn summary_of_upcoming_race_shows_countdown() {
        let state = state();
        let remaining = TimeRemaining::until(
            fixtures::round_nine_start() - Duration::seconds(90),
            fixtures::round_nine_start(),
        );
        let line = summary(&state, remaining);
        assert!(line.starts_with("R9 "), "{line}");
        assert!(line.contains("starts in 0d 00h 01m 30s"), "{line}");
        assert!(line.contains("push disconnected"), "{line}");
    }

    #[test]
    fn summary_of_live_race_shows_lap_weather_and_leader() {
        let mut state = state();
        state.status = RaceStatus::Live;
        state.connection = ConnectionHealth::Connected;
        state.telemetry = Some(LapSummary {
            lap_count: 40,
            leader_lap: Some(23),
        });
        state.weather = Some(fixtures::weather("clear sky"));
        state.predictions = fixtures::prediction_set(&["VER", "NOR"]);

        let line = summary(&state, TimeRemaining::default());
        assert!(line.contains("lap 23"), "{line}");
        assert!(line.contains("push connected"), "{line}");
        assert!(line.contains("21.0°C clear sky"), "{line}");
        assert!(line.contains("VER leads (40.0%)"), "{line}");
        assert!(!line.contains("starts in"), "{line}");
    }
}
