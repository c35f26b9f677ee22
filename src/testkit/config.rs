//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::time::Duration;

use crate::application::channel::{BackoffPolicy, ChannelSettings};
use crate::infrastructure::config::channel::ReconnectionConfig;
use crate::infrastructure::config::schedule::ScheduleEntry;
use crate::infrastructure::config::settings::Config;

/// Fast reconnection config with minimal delays.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 10,
        max_delay_ms: 40,
        backoff_multiplier: 2.0,
        max_consecutive_failures: 10,
        circuit_breaker_cooldown_ms: 100,
    }
}

/// Channel timing in milliseconds instead of seconds.
pub fn channel() -> ChannelSettings {
    ChannelSettings {
        keepalive_period: Duration::from_millis(100),
        silence_multiplier: 3,
        connect_timeout: Duration::from_millis(50),
        backoff: BackoffPolicy::from(&reconnection()),
    }
}

/// Engine config over the three-round test calendar with a fast clock.
///
/// Auto refresh is off and pull intervals are long, so each cycle polls once
/// at startup unless a test moves the active event.
pub fn engine() -> Config {
    let mut config = Config::default();
    config.schedule = vec![
        entry(8, "Monaco Grand Prix", "Monte Carlo", "2025-06-08"),
        entry(9, "Canadian Grand Prix", "Montreal", "2025-06-15"),
        entry(10, "Spanish Grand Prix", "Barcelona", "2025-06-29"),
    ];
    config.clock.tick_ms = 10;
    config.channel.reconnection = reconnection();
    config.api.request_timeout_ms = 200;
    config.api.persist_timeout_ms = 200;
    config.weather.lookup_timeout_ms = 200;
    config.predictions.auto_refresh_secs = 0;
    config.predictions.timeout_ms = 500;
    config
}

fn entry(round: u32, name: &str, location: &str, date: &str) -> ScheduleEntry {
    ScheduleEntry {
        round,
        name: name.to_string(),
        location: location.to_string(),
        date: date.to_string(),
        time: "14:00:00".to_string(),
        lat: 45.5048,
        lon: -73.5522,
    }
}
