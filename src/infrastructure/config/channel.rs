//! Push channel and reconnection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::channel::{BackoffPolicy, ChannelSettings};

/// `[channel]`: where the push server lives and how quiet it may get.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Interval between keepalive pings (seconds).
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Keepalive periods of silence tolerated before reconnecting.
    #[serde(default = "default_silence_multiplier")]
    pub silence_multiplier: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
}

fn default_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

const fn default_keepalive_secs() -> u64 {
    30
}

const fn default_silence_multiplier() -> u32 {
    3
}

const fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            keepalive_secs: default_keepalive_secs(),
            silence_multiplier: default_silence_multiplier(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnection: ReconnectionConfig::default(),
        }
    }
}

impl ChannelConfig {
    #[must_use]
    pub fn to_settings(&self) -> ChannelSettings {
        ChannelSettings {
            keepalive_period: Duration::from_secs(self.keepalive_secs),
            silence_multiplier: self.silence_multiplier,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            backoff: BackoffPolicy::from(&self.reconnection),
        }
    }
}

/// WebSocket reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum consecutive failures before circuit breaker trips.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Cooldown period after circuit breaker trips (milliseconds).
    #[serde(default = "default_circuit_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    1000 // 1 second
}

fn default_max_delay_ms() -> u64 {
    60000 // 60 seconds
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_consecutive_failures() -> u32 {
    10
}

fn default_circuit_breaker_cooldown_ms() -> u64 {
    300000 // 5 minutes
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_circuit_breaker_cooldown_ms(),
        }
    }
}

impl From<&ReconnectionConfig> for BackoffPolicy {
    fn from(config: &ReconnectionConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.backoff_multiplier,
            max_consecutive_failures: config.max_consecutive_failures,
            circuit_breaker_cooldown: Duration::from_millis(config.circuit_breaker_cooldown_ms),
        }
    }
}
