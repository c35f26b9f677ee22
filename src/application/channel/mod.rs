//! Push channel supervision.

pub mod backoff;
pub mod live;

use std::time::Duration;

pub use backoff::{Backoff, BackoffPolicy};
pub use live::LiveChannel;

/// Timing for the push connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSettings {
    /// How often a keepalive probe is sent while connected.
    pub keepalive_period: Duration,
    /// The connection is dropped after this many keepalive periods without
    /// any inbound traffic.
    pub silence_multiplier: u32,
    pub connect_timeout: Duration,
    pub backoff: BackoffPolicy,
}

impl ChannelSettings {
    /// Longest tolerated gap between inbound frames.
    #[must_use]
    pub fn silence_limit(&self) -> Duration {
        self.keepalive_period * self.silence_multiplier.max(1)
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            keepalive_period: Duration::from_secs(30),
            silence_multiplier: 3,
            connect_timeout: Duration::from_secs(10),
            backoff: BackoffPolicy::default(),
        }
    }
}
