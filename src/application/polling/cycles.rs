use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::PollCycle;
use crate::application::proposal::PollOutcome;
use crate::domain::{FeedKind, RaceState};
use crate::error::Result;
use crate::port::{HealthProbe, TelemetryService, WeatherService};

/// Weather at the active venue.
///
/// Polls early when the venue moves or the active round changes.
pub struct WeatherCycle {
    service: Arc<dyn WeatherService>,
    period: Duration,
}

impl WeatherCycle {
    pub fn new(service: Arc<dyn WeatherService>, period: Duration) -> Self {
        Self { service, period }
    }
}

#[async_trait]
impl PollCycle for WeatherCycle {
    fn feed(&self) -> FeedKind {
        FeedKind::Weather
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn poll(&self, state: &RaceState) -> Result<PollOutcome> {
        let round = state.active_event.id();
        let report = self
            .service
            .current(state.active_event.coordinates())
            .await?;
        Ok(PollOutcome::Weather { round, report })
    }

    fn wants_early_poll(&self, previous: &RaceState, current: &RaceState) -> bool {
        previous.active_event.id() != current.active_event.id()
            || previous.active_event.coordinates() != current.active_event.coordinates()
    }
}

/// Live laps and running order for the selected session.
///
/// Polls early when the session selection changes.
pub struct TelemetryCycle {
    service: Arc<dyn TelemetryService>,
    period: Duration,
}

impl TelemetryCycle {
    pub fn new(service: Arc<dyn TelemetryService>, period: Duration) -> Self {
        Self { service, period }
    }
}

#[async_trait]
impl PollCycle for TelemetryCycle {
    fn feed(&self) -> FeedKind {
        FeedKind::Telemetry
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn poll(&self, state: &RaceState) -> Result<PollOutcome> {
        let session = state.session;
        let report = self.service.fetch(&session).await?;
        Ok(PollOutcome::Telemetry { session, report })
    }

    fn wants_early_poll(&self, previous: &RaceState, current: &RaceState) -> bool {
        previous.session != current.session
    }
}

/// Race server liveness.
pub struct ProbeCycle {
    probe: Arc<dyn HealthProbe>,
    period: Duration,
}

impl ProbeCycle {
    pub fn new(probe: Arc<dyn HealthProbe>, period: Duration) -> Self {
        Self { probe, period }
    }
}

#[async_trait]
impl PollCycle for ProbeCycle {
    fn feed(&self) -> FeedKind {
        FeedKind::Probe
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn poll(&self, _state: &RaceState) -> Result<PollOutcome> {
        self.probe.check().await?;
        Ok(PollOutcome::ProbeHealthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, PredictionInputs};
    use crate::testkit::domain as fixtures;
    use crate::testkit::services::{StubTelemetry, StubWeather};

    fn state() -> RaceState {
        RaceState::initial(
            &fixtures::catalog(),
            fixtures::round_nine_start() - chrono::Duration::hours(1),
            fixtures::session(),
            PredictionInputs::default(),
        )
    }

    #[tokio::test]
    async fn weather_is_tagged_with_polled_round() {
        let cycle = WeatherCycle::new(
            Arc::new(StubWeather::always(fixtures::weather("clear sky"))),
            Duration::from_secs(300),
        );
        let state = state();

        let outcome = cycle.poll(&state).await.unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Weather {
                round: state.active_event.id(),
                report: fixtures::weather("clear sky"),
            }
        );
    }

    #[test]
    fn weather_polls_early_on_relocation_only() {
        let cycle = WeatherCycle::new(
            Arc::new(StubWeather::always(fixtures::weather("clear sky"))),
            Duration::from_secs(300),
        );
        let before = state();
        let mut status_only = before.clone();
        status_only.status = crate::domain::RaceStatus::Live;
        let mut moved = before.clone();
        moved.active_event = before
            .active_event
            .relocated("Toronto", Coordinates::try_new(43.65, -79.38).unwrap());

        assert!(!cycle.wants_early_poll(&before, &status_only));
        assert!(cycle.wants_early_poll(&before, &moved));
    }

    #[tokio::test]
    async fn telemetry_failure_propagates() {
        let cycle = TelemetryCycle::new(Arc::new(StubTelemetry::failing()), Duration::from_secs(10));
        assert!(cycle.poll(&state()).await.is_err());
    }
}
