//! Season schedule lookup.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::event::EventDescriptor;
use super::id::RoundId;

/// Immutable, start-ordered list of the season's events.
///
/// Never empty: [`ScheduleCatalog::try_new`] refuses an empty list, so every
/// lookup has an answer.
#[derive(Debug, Clone)]
pub struct ScheduleCatalog {
    events: Vec<EventDescriptor>,
}

impl ScheduleCatalog {
    /// Build a catalog, ordering entries by start time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCatalog`] for an empty list and
    /// [`DomainError::DuplicateRound`] when two entries share a round.
    pub fn try_new(mut events: Vec<EventDescriptor>) -> Result<Self, DomainError> {
        if events.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event.id()) {
                return Err(DomainError::DuplicateRound {
                    round: event.id().get(),
                });
            }
        }

        events.sort_by_key(EventDescriptor::starts_at);
        Ok(Self { events })
    }

    /// First event starting strictly after `now`, or the last event once the
    /// season is over.
    #[must_use]
    pub fn lookup_next(&self, now: DateTime<Utc>) -> &EventDescriptor {
        self.events
            .iter()
            .find(|event| event.starts_at() > now)
            .unwrap_or_else(|| self.last())
    }

    /// All events in start order.
    #[must_use]
    pub fn all(&self) -> &[EventDescriptor] {
        &self.events
    }

    /// Event with the given round, if scheduled.
    #[must_use]
    pub fn get(&self, id: RoundId) -> Option<&EventDescriptor> {
        self.events.iter().find(|event| event.id() == id)
    }

    #[must_use]
    pub fn first(&self) -> &EventDescriptor {
        &self.events[0]
    }

    #[must_use]
    pub fn last(&self) -> &EventDescriptor {
        &self.events[self.events.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Coordinates;
    use chrono::{Duration, TimeZone};

    fn event(round: u32, start: DateTime<Utc>) -> EventDescriptor {
        EventDescriptor::new(
            RoundId::try_new(round).unwrap(),
            format!("Round {round}"),
            "Somewhere",
            Coordinates::try_new(0.0, 0.0).unwrap(),
            start,
        )
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap()
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            ScheduleCatalog::try_new(vec![]),
            Err(DomainError::EmptyCatalog)
        ));
    }

    #[test]
    fn duplicate_round_is_rejected() {
        let result = ScheduleCatalog::try_new(vec![event(3, base()), event(3, base())]);
        assert!(matches!(result, Err(DomainError::DuplicateRound { round: 3 })));
    }

    #[test]
    fn lookup_next_returns_first_future_event() {
        let catalog = ScheduleCatalog::try_new(vec![
            event(10, base() + Duration::days(7)),
            event(9, base()),
            event(11, base() + Duration::days(14)),
        ])
        .unwrap();

        let before = base() - Duration::hours(1);
        assert_eq!(catalog.lookup_next(before).id().get(), 9);

        // Exactly at the start the event is no longer "next".
        assert_eq!(catalog.lookup_next(base()).id().get(), 10);
    }

    #[test]
    fn lookup_next_falls_back_to_last_event() {
        let catalog =
            ScheduleCatalog::try_new(vec![event(1, base()), event(2, base() + Duration::days(7))])
                .unwrap();

        let after_season = base() + Duration::days(30);
        assert_eq!(catalog.lookup_next(after_season).id().get(), 2);
    }

    #[test]
    fn entries_are_sorted_by_start() {
        let catalog = ScheduleCatalog::try_new(vec![
            event(2, base() + Duration::days(7)),
            event(1, base()),
        ])
        .unwrap();

        let rounds: Vec<u32> = catalog.all().iter().map(|e| e.id().get()).collect();
        assert_eq!(rounds, vec![1, 2]);
        assert_eq!(catalog.first().id().get(), 1);
        assert_eq!(catalog.last().id().get(), 2);
        assert!(catalog.get(RoundId::try_new(2).unwrap()).is_some());
        assert!(catalog.get(RoundId::try_new(5).unwrap()).is_none());
    }
}
