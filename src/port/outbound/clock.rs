//! Wall-clock port.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Everything that compares against event start times reads the time
/// through this trait so tests can move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
