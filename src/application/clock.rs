//! Event clock: countdown and the time-derived live edge.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::proposal::{Proposal, ProposalSender, UpdateEnvelope};
use super::shutdown;
use crate::domain::{EventDescriptor, RaceState, RaceStatus, RoundId, SourceKind, TimeRemaining};
use crate::port::Clock;

/// What the clock observed about the active event on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFact {
    /// Round the fact was computed for. The coordinator drops facts about a
    /// round that is no longer active.
    pub round: RoundId,
    pub now: DateTime<Utc>,
    pub remaining: TimeRemaining,
    /// `Live` once the start has passed, `Upcoming` before. Never `Finished`.
    pub derived: RaceStatus,
}

/// Periodic ticker proposing [`ClockFact`]s.
pub struct EventClock {
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl EventClock {
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self { clock, period }
    }

    /// Derive the fact for `event` at `now`.
    #[must_use]
    pub fn tick(now: DateTime<Utc>, event: &EventDescriptor) -> ClockFact {
        let derived = if event.has_started(now) {
            RaceStatus::Live
        } else {
            RaceStatus::Upcoming
        };
        ClockFact {
            round: event.id(),
            now,
            remaining: TimeRemaining::until(now, event.starts_at()),
            derived,
        }
    }

    /// Tick until shutdown, proposing one fact per period.
    pub async fn run(
        self,
        state: watch::Receiver<RaceState>,
        proposals: ProposalSender,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = self.period.as_millis() as u64, "Event clock started");

        loop {
            tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    let fact = Self::tick(now, &state.borrow().active_event);
                    let envelope = UpdateEnvelope::new(SourceKind::Clock, fact, now);
                    if proposals.propose(Proposal::Clock(envelope)).await.is_err() {
                        debug!("Coordinator gone, stopping event clock");
                        break;
                    }
                }
            }
        }

        info!("Event clock stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn event_at(start: DateTime<Utc>) -> EventDescriptor {
        EventDescriptor::new(
            RoundId::try_new(9).unwrap(),
            "Canadian Grand Prix",
            "Montreal",
            Coordinates::try_new(45.5, -73.5).unwrap(),
            start,
        )
    }

    #[test]
    fn before_start_is_upcoming_with_countdown() {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let fact = EventClock::tick(start - ChronoDuration::seconds(10), &event_at(start));

        assert_eq!(fact.derived, RaceStatus::Upcoming);
        assert_eq!(fact.remaining.total_seconds(), 10);
        assert_eq!(fact.round.get(), 9);
    }

    #[test]
    fn at_start_is_live_with_zero_countdown() {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let fact = EventClock::tick(start, &event_at(start));

        assert_eq!(fact.derived, RaceStatus::Live);
        assert!(fact.remaining.is_zero());
    }

    #[test]
    fn never_derives_finished() {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let fact = EventClock::tick(start + ChronoDuration::days(60), &event_at(start));
        assert_eq!(fact.derived, RaceStatus::Live);
    }
}
