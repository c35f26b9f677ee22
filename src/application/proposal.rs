//! Proposed state changes and the queue that carries them to the coordinator.
//!
//! Producers (clock, push channel, poll cycles, prediction refresher and
//! operator controls) never touch the race state. They wrap what they observed
//! in an [`UpdateEnvelope`] and submit it; the coordinator decides.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

use super::clock::ClockFact;
use crate::domain::{
    ConnectionHealth, Coordinates, FeedKind, PredictionSet, QualifyingEntry, RoundId, SessionKey,
    SourceKind, TelemetryReport, WeatherReport,
};
use crate::error::{Error, Rejection, Result};
use crate::port::PushMessage;

/// A payload tagged with where and when it was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEnvelope<T> {
    pub source: SourceKind,
    pub payload: T,
    pub observed_at: DateTime<Utc>,
}

impl<T> UpdateEnvelope<T> {
    pub fn new(source: SourceKind, payload: T, observed_at: DateTime<Utc>) -> Self {
        Self {
            source,
            payload,
            observed_at,
        }
    }
}

/// Result of one pull cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Weather fetched for the given round's venue.
    Weather {
        round: RoundId,
        report: WeatherReport,
    },
    /// Telemetry fetched for the given session.
    Telemetry {
        session: SessionKey,
        report: TelemetryReport,
    },
    /// The race server answered the health probe.
    ProbeHealthy,
    /// The cycle failed. Details were logged by the cycle.
    Failed { feed: FeedKind },
}

impl PollOutcome {
    #[must_use]
    pub const fn feed(&self) -> FeedKind {
        match self {
            Self::Weather { .. } => FeedKind::Weather,
            Self::Telemetry { .. } => FeedKind::Telemetry,
            Self::ProbeHealthy => FeedKind::Probe,
            Self::Failed { feed } => *feed,
        }
    }
}

/// Explicit operator requests.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    MarkFinished,
    AdvanceTo(RoundId),
    /// Wrap back to the schedule's next event regardless of round ordering.
    ResetSeason,
    Relocate {
        location: String,
        coordinates: Coordinates,
    },
    UpdateQualifying(Vec<QualifyingEntry>),
    UpdateTeamPoints(BTreeMap<String, f64>),
    SetSession(SessionKey),
}

/// Everything the coordinator can be asked to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    Clock(UpdateEnvelope<ClockFact>),
    Push(UpdateEnvelope<PushMessage>),
    Connection(UpdateEnvelope<ConnectionHealth>),
    Poll(UpdateEnvelope<PollOutcome>),
    /// A prediction set from the generator.
    Predictions(UpdateEnvelope<PredictionSet>),
    Operator(UpdateEnvelope<OperatorAction>),
}

impl Proposal {
    #[must_use]
    pub const fn source(&self) -> SourceKind {
        match self {
            Self::Clock(env) => env.source,
            Self::Push(env) => env.source,
            Self::Connection(env) => env.source,
            Self::Poll(env) => env.source,
            Self::Predictions(env) => env.source,
            Self::Operator(env) => env.source,
        }
    }
}

/// Reply sent back for proposals that wait on the decision.
pub type Decision = std::result::Result<bool, Rejection>;

/// A proposal plus an optional reply slot.
#[derive(Debug)]
pub struct Submission {
    pub proposal: Proposal,
    pub reply: Option<oneshot::Sender<Decision>>,
}

/// Cloneable handle for submitting proposals.
#[derive(Debug, Clone)]
pub struct ProposalSender {
    tx: mpsc::Sender<Submission>,
}

impl ProposalSender {
    pub(crate) fn new(tx: mpsc::Sender<Submission>) -> Self {
        Self { tx }
    }

    /// Queue a proposal without waiting for the decision.
    pub async fn propose(&self, proposal: Proposal) -> Result<()> {
        self.tx
            .send(Submission {
                proposal,
                reply: None,
            })
            .await
            .map_err(|_| Error::CoordinatorStopped)
    }

    /// Queue a proposal and wait for the coordinator's decision.
    ///
    /// `Ok(true)` when the state changed. A refused proposal comes back as
    /// [`Error::Rejected`].
    pub async fn propose_and_wait(&self, proposal: Proposal) -> Result<bool> {
        let (reply, decision) = oneshot::channel();
        self.tx
            .send(Submission {
                proposal,
                reply: Some(reply),
            })
            .await
            .map_err(|_| Error::CoordinatorStopped)?;
        let changed = decision.await.map_err(|_| Error::CoordinatorStopped)??;
        Ok(changed)
    }

    /// True once the coordinator has stopped accepting proposals.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
