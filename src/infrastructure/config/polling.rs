//! Periodic task configuration: pull cycles and the event clock.

use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::openweather::DEFAULT_BASE_URL;
use crate::domain::SessionKind;

/// Environment variable holding the OpenWeather API key.
pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// `[weather]`
#[derive(Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_weather_url")]
    pub url: String,
    #[serde(default = "default_weather_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound for one geocoding lookup.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Loaded from `OPENWEATHER_API_KEY`, never from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("interval_secs", &self.interval_secs)
            .field("lookup_timeout_ms", &self.lookup_timeout_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_weather_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_weather_interval_secs() -> u64 {
    300
}

const fn default_lookup_timeout_ms() -> u64 {
    5_000
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_weather_url(),
            interval_secs: default_weather_interval_secs(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            api_key: None,
        }
    }
}

impl WeatherConfig {
    /// The key, when weather is enabled and one was provided.
    #[must_use]
    pub fn active_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| self.enabled && !key.trim().is_empty())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// `[telemetry]`: which session the live timing cycle follows.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_telemetry_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_season")]
    pub season: u16,
    /// Session code: FP1, FP2, FP3, Q, S or R.
    #[serde(default)]
    pub session: SessionKind,
}

const fn default_telemetry_interval_secs() -> u64 {
    10
}

const fn default_season() -> u16 {
    2025
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_telemetry_interval_secs(),
            season: default_season(),
            session: SessionKind::default(),
        }
    }
}

impl TelemetryConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// `[probe]`: race server health check.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_probe_interval_secs")]
    pub interval_secs: u64,
}

const fn default_probe_interval_secs() -> u64 {
    10
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_probe_interval_secs(),
        }
    }
}

impl ProbeConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// `[clock]`
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Event clock tick period (milliseconds).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

const fn default_tick_ms() -> u64 {
    1_000
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl ClockConfig {
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_key_needs_enabled_flag() {
        let mut config = WeatherConfig {
            api_key: Some("abc".into()),
            ..WeatherConfig::default()
        };
        assert_eq!(config.active_key(), Some("abc"));

        config.enabled = false;
        assert_eq!(config.active_key(), None);

        config.enabled = true;
        config.api_key = Some("  ".into());
        assert_eq!(config.active_key(), None);
    }

    #[test]
    fn session_code_parses_case_insensitively() {
        let config: TelemetryConfig = toml::from_str("session = \"q\"").unwrap();
        assert_eq!(config.session, SessionKind::Qualifying);
        assert_eq!(config.season, 2025);
    }

    #[test]
    fn debug_hides_weather_key() {
        let config = WeatherConfig {
            api_key: Some("topsecret".into()),
            ..WeatherConfig::default()
        };
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
