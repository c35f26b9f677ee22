//! The committed race state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::catalog::ScheduleCatalog;
use super::event::EventDescriptor;
use super::prediction::{PredictionInputs, PredictionSet};
use super::source::{FeedKind, SourceKind};
use super::status::{ConnectionHealth, RaceStatus};
use super::telemetry::{LapSummary, SessionKey};
use super::weather::WeatherReport;

/// Provenance of the committed prediction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionsMeta {
    pub source: SourceKind,
    pub observed_at: DateTime<Utc>,
}

/// Coarse health of one pull cycle.
///
/// Failure reasons are logged where they happen and never stored here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CycleStatus {
    #[default]
    Pending,
    Fresh {
        at: DateTime<Utc>,
    },
    Failed {
        since: DateTime<Utc>,
        consecutive: u32,
    },
}

impl CycleStatus {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Status after one more failed attempt at `now`.
    #[must_use]
    pub fn after_failure(self, now: DateTime<Utc>) -> Self {
        match self {
            Self::Failed { since, consecutive } => Self::Failed {
                since,
                consecutive: consecutive.saturating_add(1),
            },
            Self::Pending | Self::Fresh { .. } => Self::Failed {
                since: now,
                consecutive: 1,
            },
        }
    }
}

/// Health of every pull cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedHealth {
    pub weather: CycleStatus,
    pub telemetry: CycleStatus,
    pub probe: CycleStatus,
}

impl FeedHealth {
    #[must_use]
    pub const fn get(&self, feed: FeedKind) -> CycleStatus {
        match feed {
            FeedKind::Weather => self.weather,
            FeedKind::Telemetry => self.telemetry,
            FeedKind::Probe => self.probe,
        }
    }

    pub fn set(&mut self, feed: FeedKind, status: CycleStatus) {
        match feed {
            FeedKind::Weather => self.weather = status,
            FeedKind::Telemetry => self.telemetry = status,
            FeedKind::Probe => self.probe = status,
        }
    }
}

/// Single source of truth for what the operator sees.
///
/// Only the state coordinator builds new values of this type; everyone else
/// reads whole snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceState {
    pub active_event: EventDescriptor,
    pub status: RaceStatus,
    pub predictions: PredictionSet,
    pub predictions_meta: Option<PredictionsMeta>,
    /// Commit time of the most recent change.
    pub last_update: DateTime<Utc>,
    pub connection: ConnectionHealth,
    pub weather: Option<WeatherReport>,
    pub weather_observed_at: Option<DateTime<Utc>>,
    pub telemetry: Option<LapSummary>,
    pub feeds: FeedHealth,
    pub session: SessionKey,
    pub inputs: PredictionInputs,
}

impl RaceState {
    /// State at process start.
    ///
    /// The active event is `catalog.lookup_next(now)`. When that is the
    /// season-over fallback (its start already passed) the race starts out
    /// finished; otherwise upcoming. The session follows the active round.
    #[must_use]
    pub fn initial(
        catalog: &ScheduleCatalog,
        now: DateTime<Utc>,
        session: SessionKey,
        inputs: PredictionInputs,
    ) -> Self {
        let event = catalog.lookup_next(now).clone();
        let status = initial_status(&event, now);
        Self {
            session: session.for_round(event.id()),
            active_event: event,
            status,
            predictions: PredictionSet::empty(),
            predictions_meta: None,
            last_update: now,
            connection: ConnectionHealth::Disconnected,
            weather: None,
            weather_observed_at: None,
            telemetry: None,
            feeds: FeedHealth::default(),
            inputs,
        }
    }
}

/// Status for a freshly selected event: finished when its start has already
/// passed (only possible for the season-over fallback), upcoming otherwise.
#[must_use]
pub fn initial_status(event: &EventDescriptor, now: DateTime<Utc>) -> RaceStatus {
    if event.has_started(now) {
        RaceStatus::Finished
    } else {
        RaceStatus::Upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Coordinates;
    use crate::domain::id::RoundId;
    use crate::domain::telemetry::SessionKind;
    use chrono::{Duration, TimeZone};

    fn catalog() -> ScheduleCatalog {
        let start = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        ScheduleCatalog::try_new(vec![
            EventDescriptor::new(
                RoundId::try_new(9).unwrap(),
                "Canadian Grand Prix",
                "Montreal",
                Coordinates::try_new(45.5, -73.5).unwrap(),
                start,
            ),
            EventDescriptor::new(
                RoundId::try_new(10).unwrap(),
                "Spanish Grand Prix",
                "Barcelona",
                Coordinates::try_new(41.57, 2.26).unwrap(),
                start + Duration::days(14),
            ),
        ])
        .unwrap()
    }

    fn session() -> SessionKey {
        SessionKey::new(2025, RoundId::try_new(1).unwrap(), SessionKind::Race)
    }

    #[test]
    fn initial_state_targets_next_event() {
        let now = Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap();
        let state = RaceState::initial(&catalog(), now, session(), PredictionInputs::default());

        assert_eq!(state.active_event.id().get(), 10);
        assert_eq!(state.status, RaceStatus::Upcoming);
        assert_eq!(state.session.round.get(), 10);
        assert_eq!(state.connection, ConnectionHealth::Disconnected);
        assert!(state.predictions.is_empty());
    }

    #[test]
    fn initial_state_after_season_is_finished() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        let state = RaceState::initial(&catalog(), now, session(), PredictionInputs::default());

        assert_eq!(state.active_event.id().get(), 10);
        assert_eq!(state.status, RaceStatus::Finished);
    }

    #[test]
    fn failures_accumulate_and_keep_first_timestamp() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let once = CycleStatus::Fresh { at: t0 }.after_failure(t0);
        let twice = once.after_failure(t0 + Duration::seconds(10));

        assert_eq!(
            twice,
            CycleStatus::Failed {
                since: t0,
                consecutive: 2
            }
        );
        assert!(twice.is_failed());
    }
}
