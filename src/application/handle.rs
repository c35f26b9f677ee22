//! Operator-facing handle over the running engine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::info;

use super::proposal::{OperatorAction, Proposal, ProposalSender, UpdateEnvelope};
use super::refresh::PredictionRefresher;
use crate::domain::{
    QualifyingEntry, RaceState, RoundId, SessionKey, SourceKind, TimeRemaining,
};
use crate::error::{Error, Result};
use crate::port::{Clock, Geocoder, RaceControl, RaceView, RefreshOutcome};

/// Locations this short are not worth a lookup.
const MIN_LOCATION_CHARS: usize = 3;

/// Cloneable access to committed state and operator controls.
#[derive(Clone)]
pub struct RaceHandle {
    state: watch::Receiver<RaceState>,
    proposals: ProposalSender,
    clock: Arc<dyn Clock>,
    refresher: PredictionRefresher,
    geocoder: Arc<dyn Geocoder>,
    lookup_timeout: Duration,
}

impl RaceHandle {
    pub fn new(
        state: watch::Receiver<RaceState>,
        proposals: ProposalSender,
        clock: Arc<dyn Clock>,
        refresher: PredictionRefresher,
        geocoder: Arc<dyn Geocoder>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            state,
            proposals,
            clock,
            refresher,
            geocoder,
            lookup_timeout,
        }
    }

    async fn operate(&self, action: OperatorAction) -> Result<bool> {
        let envelope = UpdateEnvelope::new(SourceKind::Operator, action, self.clock.now());
        self.proposals
            .propose_and_wait(Proposal::Operator(envelope))
            .await
    }
}

impl RaceView for RaceHandle {
    fn snapshot(&self) -> RaceState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<RaceState> {
        self.state.clone()
    }

    fn countdown(&self) -> TimeRemaining {
        let start = self.state.borrow().active_event.starts_at();
        TimeRemaining::until(self.clock.now(), start)
    }
}

#[async_trait]
impl RaceControl for RaceHandle {
    fn request_prediction_refresh(&self) -> RefreshOutcome {
        self.refresher.request()
    }

    async fn mark_finished(&self) -> Result<bool> {
        self.operate(OperatorAction::MarkFinished).await
    }

    async fn advance_to(&self, round: RoundId) -> Result<bool> {
        self.operate(OperatorAction::AdvanceTo(round)).await
    }

    async fn reset_season(&self) -> Result<bool> {
        self.operate(OperatorAction::ResetSeason).await
    }

    async fn relocate(&self, location: &str) -> Result<bool> {
        let location = location.trim();
        if location.chars().count() < MIN_LOCATION_CHARS {
            return Ok(false);
        }

        let limit = self.lookup_timeout;
        let found = timeout(limit, self.geocoder.locate(location))
            .await
            .map_err(|_| Error::Timeout {
                operation: "geocoding",
                millis: limit.as_millis() as u64,
            })??;

        let Some(coordinates) = found else {
            info!(location, "No geocoding match");
            return Ok(false);
        };

        self.operate(OperatorAction::Relocate {
            location: location.to_string(),
            coordinates,
        })
        .await
    }

    async fn update_qualifying(&self, entries: Vec<QualifyingEntry>) -> Result<bool> {
        self.operate(OperatorAction::UpdateQualifying(entries)).await
    }

    async fn update_team_points(&self, points: BTreeMap<String, f64>) -> Result<bool> {
        self.operate(OperatorAction::UpdateTeamPoints(points)).await
    }

    async fn set_session(&self, session: SessionKey) -> Result<bool> {
        self.operate(OperatorAction::SetSession(session)).await
    }
}
