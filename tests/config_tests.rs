use std::io::Write;

use racewatch::domain::SessionKind;
use racewatch::error::{ConfigError, Error};
use racewatch::infrastructure::config::logging::LogFormat;
use racewatch::infrastructure::config::settings::Config;

fn write_temp_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn invalid_field(result: racewatch::error::Result<Config>) -> &'static str {
    match result {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
        Err(err) => panic!("expected an invalid value error, got {err}"),
        Ok(_) => panic!("expected an invalid value error, got a config"),
    }
}

#[test]
fn full_config_file_loads() {
    let file = write_temp_config(
        r#"
[logging]
level = "debug"
format = "json"

[channel]
url = "wss://race.example/ws"
keepalive_secs = 15

[channel.reconnection]
initial_delay_ms = 500

[api]
url = "https://race.example"

[weather]
enabled = false

[telemetry]
season = 2024
session = "Q"

[clock]
tick_ms = 500

[predictions]
auto_refresh_secs = 0

[[schedule]]
round = 1
name = "Australian Grand Prix"
location = "Melbourne"
date = "2025-03-16"
time = "04:00:00"
lat = -37.8497
lon = 144.968

[[schedule]]
round = 2
name = "Chinese Grand Prix"
location = "Shanghai"
date = "2025-03-23"
lat = 31.3389
lon = 121.2197

[[qualifying]]
driver = "Lando Norris"
team = "McLaren"
position = 1

[[qualifying]]
driver = "Oscar Piastri"
team = "McLaren"
position = 2

[team_points]
McLaren = 100.0
"#,
    );

    let config = Config::load(file.path()).expect("config loads");

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.channel.keepalive_secs, 15);
    assert_eq!(config.channel.reconnection.initial_delay_ms, 500);
    assert_eq!(config.channel.reconnection.max_delay_ms, 60_000);
    assert!(!config.weather.enabled);
    assert_eq!(config.weather.active_key(), None);
    assert_eq!(config.telemetry.session, SessionKind::Qualifying);
    assert_eq!(config.predictions.auto_refresh(), None);

    let catalog = config.catalog().unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.first().starts_at().to_rfc3339(),
        "2025-03-16T04:00:00+00:00"
    );
    assert_eq!(catalog.last().starts_at().format("%H:%M").to_string(), "14:00");

    let inputs = config.prediction_inputs().unwrap();
    assert_eq!(inputs.qualifying().len(), 2);
    assert_eq!(inputs.points_for("McLaren"), 100.0);

    let session = config.session(catalog.first().id());
    assert_eq!(session.season, 2024);
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/nonexistent/racewatch/config.toml");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_temp_config("[clock\ntick_ms = 1");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn push_url_must_be_websocket() {
    let file = write_temp_config("[channel]\nurl = \"http://race.example/ws\"\n");
    assert_eq!(invalid_field(Config::load(file.path())), "channel.url");
}

#[test]
fn zero_tick_is_rejected() {
    let file = write_temp_config("[clock]\ntick_ms = 0\n");
    assert_eq!(invalid_field(Config::load(file.path())), "clock.tick_ms");
}

#[test]
fn backoff_below_one_is_rejected() {
    let file = write_temp_config("[channel.reconnection]\nbackoff_multiplier = 0.5\n");
    assert_eq!(
        invalid_field(Config::load(file.path())),
        "backoff_multiplier"
    );
}

#[test]
fn unparseable_race_date_is_rejected() {
    let file = write_temp_config(
        r#"
[[schedule]]
round = 1
name = "Somewhere Grand Prix"
location = "Somewhere"
date = "March 16th"
lat = 0.0
lon = 0.0
"#,
    );
    assert_eq!(invalid_field(Config::load(file.path())), "schedule");
}

#[test]
fn duplicate_grid_positions_are_rejected() {
    let file = write_temp_config(
        r#"
[[qualifying]]
driver = "Lando Norris"
team = "McLaren"
position = 1

[[qualifying]]
driver = "Oscar Piastri"
team = "McLaren"
position = 1
"#,
    );
    assert_eq!(invalid_field(Config::load(file.path())), "qualifying");
}

#[test]
fn empty_schedule_is_a_missing_field() {
    let file = write_temp_config("schedule = []\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::MissingField { field: "schedule" }))
    ));
}
