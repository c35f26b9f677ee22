use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Time left until an event starts, clamped at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// Whole seconds from `now` until `start`, split into units.
    #[must_use]
    pub fn until(now: DateTime<Utc>, start: DateTime<Utc>) -> Self {
        let total = (start - now).num_seconds().max(0);
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    #[must_use]
    pub const fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn splits_into_units() {
        let now = Utc.with_ymd_and_hms(2025, 6, 13, 11, 58, 50).unwrap();
        let start = now + Duration::days(2) + Duration::hours(2) + Duration::seconds(70);

        let remaining = TimeRemaining::until(now, start);

        assert_eq!(
            remaining,
            TimeRemaining {
                days: 2,
                hours: 2,
                minutes: 1,
                seconds: 10
            }
        );
        assert_eq!(remaining.to_string(), "2d 02h 01m 10s");
    }

    #[test]
    fn clamps_to_zero_after_start() {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let remaining = TimeRemaining::until(start + Duration::minutes(5), start);
        assert!(remaining.is_zero());
    }
}
