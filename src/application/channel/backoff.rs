//! Reconnection backoff with a circuit breaker.
//!
//! Delays grow exponentially with up to 20% jitter. After too many
//! consecutive failures the breaker opens and further attempts wait out a
//! cooldown before the backoff restarts from the initial delay.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{error, info};

/// Reconnection tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_consecutive_failures: u32,
    pub circuit_breaker_cooldown: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(60_000),
            multiplier: 2.0,
            max_consecutive_failures: 10,
            circuit_breaker_cooldown: Duration::from_millis(300_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    Closed,
    /// Attempts are blocked until the instant passes.
    Open { until: Instant },
}

/// Backoff state for one connection.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    consecutive_failures: u32,
    current_delay_ms: u64,
    circuit_state: CircuitState,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current_delay_ms: millis(policy.initial_delay),
            policy,
            consecutive_failures: 0,
            circuit_state: CircuitState::Closed,
        }
    }

    /// Forget past failures after a successful connection.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = millis(self.policy.initial_delay);
        self.circuit_state = CircuitState::Closed;
    }

    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.circuit_state, CircuitState::Open { until } if Instant::now() < until)
    }

    /// Record a failed attempt or a dropped connection.
    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.consecutive_failures >= self.policy.max_consecutive_failures {
            let cooldown = self.policy.circuit_breaker_cooldown;
            self.circuit_state = CircuitState::Open {
                until: Instant::now() + cooldown,
            };
            error!(
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    /// How long to wait before the next attempt.
    ///
    /// Includes any remaining circuit-breaker cooldown. Once the cooldown has
    /// been served the breaker closes and the backoff starts over.
    pub fn delay_before_attempt(&mut self) -> Duration {
        let cooldown = match self.circuit_state {
            CircuitState::Closed => Duration::ZERO,
            CircuitState::Open { until } => {
                let remaining = until.saturating_duration_since(Instant::now());
                info!(
                    remaining_secs = remaining.as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                self.reset();
                remaining
            }
        };
        cooldown + self.next_delay()
    }

    /// Current delay plus jitter; advances the delay for the next call.
    fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_delay_ms);
        let delay = base_delay + Duration::from_millis(jitter_ms(base_delay));

        let grown = (self.current_delay_ms as f64 * self.policy.multiplier) as u64;
        self.current_delay_ms = grown.min(millis(self.policy.max_delay));

        delay
    }
}

/// Up to 20% of `base`, seeded from the sub-second clock.
fn jitter_ms(base: Duration) -> u64 {
    let range_ms = millis(base) / 5;
    if range_ms == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (range_ms + 1)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_consecutive_failures: 3,
            circuit_breaker_cooldown: Duration::from_millis(50),
        }
    }

    fn assert_delay_in_range(delay: Duration, base_ms: u64) {
        let max_ms = base_ms + base_ms / 5;
        assert!(
            (base_ms..=max_ms).contains(&(delay.as_millis() as u64)),
            "delay {delay:?} not within {base_ms}..={max_ms} ms"
        );
    }

    #[test]
    fn delay_grows_exponentially_up_to_cap() {
        let mut backoff = Backoff::new(policy());

        assert_delay_in_range(backoff.delay_before_attempt(), 10);
        assert_delay_in_range(backoff.delay_before_attempt(), 20);
        assert_delay_in_range(backoff.delay_before_attempt(), 40);
        assert_delay_in_range(backoff.delay_before_attempt(), 80);
        assert_delay_in_range(backoff.delay_before_attempt(), 100);
    }

    #[test]
    fn breaker_trips_after_max_failures() {
        let mut backoff = Backoff::new(policy());
        for _ in 0..3 {
            backoff.record_failure();
        }

        assert!(backoff.is_open());
        assert_eq!(backoff.consecutive_failures(), 3);
    }

    #[test]
    fn open_breaker_adds_cooldown_then_restarts_backoff() {
        let mut backoff = Backoff::new(policy());
        backoff.delay_before_attempt();
        backoff.delay_before_attempt();
        for _ in 0..3 {
            backoff.record_failure();
        }

        let delay = backoff.delay_before_attempt();

        // Cooldown (up to 50 ms) plus the initial delay again.
        assert!(delay >= Duration::from_millis(10));
        assert!(delay <= Duration::from_millis(62));
        assert!(!backoff.is_open());
        assert_eq!(backoff.consecutive_failures(), 0);
    }

    #[test]
    fn reset_restores_initial_delay() {
        let mut backoff = Backoff::new(policy());
        backoff.delay_before_attempt();
        backoff.delay_before_attempt();
        backoff.record_failure();

        backoff.reset();

        assert_eq!(backoff.consecutive_failures(), 0);
        assert_delay_in_range(backoff.delay_before_attempt(), 10);
    }
}
