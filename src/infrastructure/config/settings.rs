//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the OpenWeather key comes from the
//! `OPENWEATHER_API_KEY` environment variable only.
//!
//! # Example
//!
//! ```no_run
//! use racewatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::api::ApiConfig;
use super::channel::ChannelConfig;
use super::logging::LoggingConfig;
use super::polling::{ClockConfig, ProbeConfig, TelemetryConfig, WeatherConfig, WEATHER_KEY_ENV};
use super::predictions::{default_qualifying, default_team_points, PredictionsConfig};
use super::schedule::{builtin_calendar, ScheduleEntry};
use crate::domain::{PredictionInputs, QualifyingEntry, RoundId, ScheduleCatalog, SessionKey};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file runs against a local race server
/// with the built-in calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Push channel endpoint and reconnection policy.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Race server REST endpoint and HTTP tuning.
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub clock: ClockConfig,

    #[serde(default)]
    pub predictions: PredictionsConfig,

    /// Season calendar. Replaces the built-in 2025 calendar when present.
    #[serde(default = "builtin_calendar")]
    pub schedule: Vec<ScheduleEntry>,

    /// Starting grid handed to the prediction generator.
    #[serde(default = "default_qualifying")]
    pub qualifying: Vec<QualifyingEntry>,

    /// Constructor championship points by team.
    #[serde(default = "default_team_points")]
    pub team_points: BTreeMap<String, f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            channel: ChannelConfig::default(),
            api: ApiConfig::default(),
            weather: WeatherConfig::default(),
            telemetry: TelemetryConfig::default(),
            probe: ProbeConfig::default(),
            clock: ClockConfig::default(),
            predictions: PredictionsConfig::default(),
            schedule: builtin_calendar(),
            qualifying: default_qualifying(),
            team_points: default_team_points(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the OpenWeather key from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.weather.api_key = std::env::var(WEATHER_KEY_ENV).ok();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize the tracing subscriber from `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Check ranges, URLs and that the schedule and grid build.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_url("channel.url", &self.channel.url, &["ws", "wss"])?;
        check_url("api.url", &self.api.url, &["http", "https"])?;
        if self.weather.enabled {
            check_url("weather.url", &self.weather.url, &["http", "https"])?;
        }

        let positive: [(&'static str, u64); 10] = [
            ("channel.keepalive_secs", self.channel.keepalive_secs),
            ("channel.connect_timeout_ms", self.channel.connect_timeout_ms),
            ("api.timeout_ms", self.api.timeout_ms),
            ("api.request_timeout_ms", self.api.request_timeout_ms),
            ("api.persist_timeout_ms", self.api.persist_timeout_ms),
            ("weather.interval_secs", self.weather.interval_secs),
            ("telemetry.interval_secs", self.telemetry.interval_secs),
            ("probe.interval_secs", self.probe.interval_secs),
            ("clock.tick_ms", self.clock.tick_ms),
            ("predictions.timeout_ms", self.predictions.timeout_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if self.channel.silence_multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel.silence_multiplier",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.api.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.retry_max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let reconnection = &self.channel.reconnection;
        if reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconnection.max_delay_ms < reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        if reconnection.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconnection.circuit_breaker_cooldown_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "circuit_breaker_cooldown_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let weights = self.predictions.weights();
        if weights.grid < 0.0 || weights.points < 0.0 || weights.grid + weights.points <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "predictions.weights",
                reason: "weights must be non-negative and not both 0".to_string(),
            }
            .into());
        }
        if weights.sharpness.is_nan() || weights.sharpness <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "predictions.sharpness",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.schedule.is_empty() {
            return Err(ConfigError::MissingField { field: "schedule" }.into());
        }
        self.catalog()?;
        self.prediction_inputs()?;
        Ok(())
    }

    /// Build the season catalog from `[[schedule]]`.
    #[allow(clippy::result_large_err)]
    pub fn catalog(&self) -> Result<ScheduleCatalog> {
        let events = self
            .schedule
            .iter()
            .map(|entry| {
                entry.to_event().map_err(|err| ConfigError::InvalidValue {
                    field: "schedule",
                    reason: format!("round {}: {err}", entry.round),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        ScheduleCatalog::try_new(events).map_err(|err| {
            ConfigError::InvalidValue {
                field: "schedule",
                reason: err.to_string(),
            }
            .into()
        })
    }

    /// Qualifying grid plus constructor points.
    #[allow(clippy::result_large_err)]
    pub fn prediction_inputs(&self) -> Result<PredictionInputs> {
        PredictionInputs::try_new(self.qualifying.clone(), self.team_points.clone()).map_err(
            |err| {
                ConfigError::InvalidValue {
                    field: "qualifying",
                    reason: err.to_string(),
                }
                .into()
            },
        )
    }

    /// Telemetry session for `round`.
    #[must_use]
    pub fn session(&self, round: RoundId) -> SessionKey {
        SessionKey::new(self.telemetry.season, round, self.telemetry.session)
    }
}

fn check_url(field: &'static str, value: &str, schemes: &[&str]) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidValue {
        field,
        reason: err.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("scheme must be one of {}", schemes.join(", ")),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionKind;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.channel.url, "ws://localhost:8000/ws");
        assert_eq!(config.catalog().unwrap().len(), 24);
        assert_eq!(config.prediction_inputs().unwrap().qualifying().len(), 3);
        assert_eq!(config.team_points.get("McLaren"), Some(&362.0));
    }

    #[test]
    fn default_impl_matches_empty_file() {
        let parsed = Config::parse_toml("").unwrap();
        let built = Config::default();
        assert_eq!(parsed.schedule, built.schedule);
        assert_eq!(parsed.qualifying, built.qualifying);
        assert_eq!(parsed.channel.to_settings(), built.channel.to_settings());
        assert_eq!(parsed.api.http_settings(), built.api.http_settings());
    }

    #[test]
    fn rejects_http_scheme_for_channel() {
        let result = Config::parse_toml("[channel]\nurl = \"http://localhost:8000/ws\"\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "channel.url",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_zero_tick() {
        let result = Config::parse_toml("[clock]\ntick_ms = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "clock.tick_ms",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_duplicate_rounds() {
        let toml = r#"
[[schedule]]
round = 1
name = "A"
location = "A"
date = "2025-03-02"
lat = 0.0
lon = 0.0

[[schedule]]
round = 1
name = "B"
location = "B"
date = "2025-03-09"
lat = 0.0
lon = 0.0
"#;
        assert!(matches!(
            Config::parse_toml(toml),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "schedule",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_grid_with_gaps() {
        let toml = r#"
[[qualifying]]
driver = "VER"
team = "Red Bull"
position = 1

[[qualifying]]
driver = "NOR"
team = "McLaren"
position = 3
"#;
        assert!(matches!(
            Config::parse_toml(toml),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "qualifying",
                ..
            }))
        ));
    }

    #[test]
    fn session_follows_telemetry_section() {
        let config = Config::parse_toml("[telemetry]\nseason = 2024\nsession = \"Q\"\n").unwrap();
        let key = config.session(RoundId::try_new(5).unwrap());
        assert_eq!(key.season, 2024);
        assert_eq!(key.round.get(), 5);
        assert_eq!(key.kind, SessionKind::Qualifying);
    }
}
