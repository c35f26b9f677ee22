//! Pure arbitration of proposals against the committed race state.
//!
//! [`RaceLedger::apply`] performs no I/O and never awaits. It returns the side
//! effects a commit requires and leaves running them to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::application::clock::ClockFact;
use crate::application::proposal::{OperatorAction, PollOutcome, Proposal, UpdateEnvelope};
use crate::domain::{
    initial_status, CycleStatus, EventDescriptor, PredictionInputs, PredictionSet,
    PredictionsMeta, RaceState, RaceStatus, ScheduleCatalog, SessionKey, SourceKind,
};
use crate::error::Rejection;
use crate::port::{Event, PushMessage};

/// Work to do after a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Event),
    PersistEvent(EventDescriptor),
    PersistSession(SessionKey),
}

/// Outcome of applying one proposal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Commit {
    /// Whether the committed state differs from before.
    pub changed: bool,
    pub effects: Vec<Effect>,
    pub rejection: Option<Rejection>,
}

impl Commit {
    fn rejected(rejection: Rejection) -> Self {
        Self {
            rejection: Some(rejection),
            ..Self::default()
        }
    }
}

/// Owner of the committed [`RaceState`].
pub struct RaceLedger {
    state: RaceState,
    catalog: Arc<ScheduleCatalog>,
}

impl RaceLedger {
    pub fn new(state: RaceState, catalog: Arc<ScheduleCatalog>) -> Self {
        Self { state, catalog }
    }

    #[must_use]
    pub fn state(&self) -> &RaceState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &ScheduleCatalog {
        &self.catalog
    }

    /// Apply `proposal`, committing at `commit_time`.
    ///
    /// The state is replaced as a whole or not at all. `last_update` moves to
    /// `commit_time` whenever race content changes; pure bookkeeping (feed
    /// health, prediction provenance) does not move it.
    pub fn apply(&mut self, proposal: Proposal, commit_time: DateTime<Utc>) -> Commit {
        let mut next = self.state.clone();
        let mut effects = Vec::new();

        let outcome = match proposal {
            Proposal::Clock(env) => {
                self.apply_clock(&mut next, &env.payload, &mut effects);
                Ok(())
            }
            Proposal::Push(env) => {
                self.apply_push(&mut next, env, &mut effects);
                Ok(())
            }
            Proposal::Connection(env) => {
                next.connection = env.payload;
                Ok(())
            }
            Proposal::Poll(env) => {
                self.apply_poll(&mut next, env);
                Ok(())
            }
            Proposal::Predictions(env) => {
                self.apply_predictions(&mut next, env.payload, env.source, env.observed_at);
                Ok(())
            }
            Proposal::Operator(env) => self.apply_operator(&mut next, env, &mut effects),
        };

        if let Err(rejection) = outcome {
            return Commit::rejected(rejection);
        }

        if next == self.state {
            return Commit::default();
        }

        if content_differs(&self.state, &next) {
            next.last_update = commit_time.max(self.state.last_update);
        }
        self.state = next;

        Commit {
            changed: true,
            effects,
            rejection: None,
        }
    }

    fn apply_clock(&self, next: &mut RaceState, fact: &ClockFact, effects: &mut Vec<Effect>) {
        if fact.round != next.active_event.id() {
            debug!(
                fact_round = fact.round.get(),
                active_round = next.active_event.id().get(),
                "Dropping clock fact for inactive round"
            );
            return;
        }

        match next.status {
            RaceStatus::Upcoming if fact.derived == RaceStatus::Live => {
                info!(round = fact.round.get(), "Start time reached");
                go_live(next, None, effects);
            }
            RaceStatus::Finished => {
                let candidate = self.catalog.lookup_next(fact.now);
                if candidate.id() > next.active_event.id() {
                    info!(
                        from = next.active_event.id().get(),
                        to = candidate.id().get(),
                        "Rolling over to next scheduled event"
                    );
                    enter_event(next, candidate.clone(), RaceStatus::Upcoming, effects);
                }
            }
            RaceStatus::Upcoming | RaceStatus::Live => {}
        }
    }

    fn apply_push(
        &self,
        next: &mut RaceState,
        env: UpdateEnvelope<PushMessage>,
        effects: &mut Vec<Effect>,
    ) {
        match env.payload {
            PushMessage::ConnectionEstablished { current_event, .. } => {
                let Some(event) = current_event else {
                    return;
                };
                if event.id() > next.active_event.id() {
                    info!(round = event.id().get(), "Server is ahead, resyncing event");
                    let status = event.status();
                    enter_event(next, event, RaceStatus::Upcoming, effects);
                    if status == RaceStatus::Live {
                        go_live(next, None, effects);
                    }
                } else if event.id() == next.active_event.id()
                    && event.status() == RaceStatus::Live
                    && next.status == RaceStatus::Upcoming
                {
                    go_live(next, None, effects);
                }
            }
            PushMessage::StatusChanged { status, message } => match (next.status, status) {
                (RaceStatus::Upcoming, RaceStatus::Live) => go_live(next, message, effects),
                (RaceStatus::Live, RaceStatus::Finished) => finish(next, effects),
                (current, requested) => {
                    debug!(%current, %requested, "Ignoring status message");
                }
            },
            PushMessage::EventAdvanced { new_event } => {
                if new_event.id() > next.active_event.id() {
                    enter_event(next, new_event, RaceStatus::Upcoming, effects);
                } else {
                    debug!(
                        round = new_event.id().get(),
                        active = next.active_event.id().get(),
                        "Ignoring stale event advance"
                    );
                }
            }
            PushMessage::PredictionsUpdated { predictions, .. } => {
                self.apply_predictions(next, predictions, env.source, env.observed_at);
            }
            PushMessage::Countdown | PushMessage::KeepaliveAck => {}
        }
    }

    fn apply_poll(&self, next: &mut RaceState, env: UpdateEnvelope<PollOutcome>) {
        let observed_at = env.observed_at;
        match env.payload {
            PollOutcome::Weather { round, report } => {
                if round != next.active_event.id() {
                    debug!(round = round.get(), "Dropping weather for inactive round");
                    return;
                }
                if next.weather_observed_at.is_some_and(|prev| observed_at < prev) {
                    debug!("Dropping out-of-order weather report");
                    return;
                }
                next.weather = Some(report);
                next.weather_observed_at = Some(observed_at);
                next.feeds.weather = CycleStatus::Fresh { at: observed_at };
            }
            PollOutcome::Telemetry { session, report } => {
                if session != next.session {
                    debug!(%session, "Dropping telemetry for inactive session");
                    return;
                }
                next.telemetry = Some(report.laps);
                next.feeds.telemetry = CycleStatus::Fresh { at: observed_at };
                if let Some(predictions) = report.predictions {
                    self.apply_predictions(next, predictions, env.source, observed_at);
                }
            }
            PollOutcome::ProbeHealthy => {
                next.feeds.probe = CycleStatus::Fresh { at: observed_at };
            }
            PollOutcome::Failed { feed } => {
                let status = next.feeds.get(feed).after_failure(observed_at);
                next.feeds.set(feed, status);
            }
        }
    }

    /// Replace the prediction set unless the update is stale.
    ///
    /// At the same instant as the committed set the higher-precedence source
    /// wins, even if that set was committed later than it was observed.
    /// Otherwise stale means observed before the last committed change, or
    /// before the committed set itself. An identical set changes nothing.
    fn apply_predictions(
        &self,
        next: &mut RaceState,
        predictions: PredictionSet,
        source: SourceKind,
        observed_at: DateTime<Utc>,
    ) {
        let wins_tie = next.predictions_meta.is_some_and(|meta| {
            observed_at == meta.observed_at && source.precedence() > meta.source.precedence()
        });
        if !wins_tie {
            if observed_at < self.state.last_update {
                debug!(%source, "Dropping predictions older than last update");
                return;
            }
            if let Some(meta) = next.predictions_meta {
                let older = observed_at < meta.observed_at;
                let outranked = observed_at == meta.observed_at
                    && source.precedence() < meta.source.precedence();
                if older || outranked {
                    debug!(%source, committed = %meta.source, "Dropping superseded predictions");
                    return;
                }
            }
        }
        if next.predictions == predictions {
            return;
        }
        next.predictions = predictions;
        next.predictions_meta = Some(PredictionsMeta {
            source,
            observed_at,
        });
    }

    fn apply_operator(
        &self,
        next: &mut RaceState,
        env: UpdateEnvelope<OperatorAction>,
        effects: &mut Vec<Effect>,
    ) -> Result<(), Rejection> {
        match env.payload {
            OperatorAction::MarkFinished => match next.status {
                RaceStatus::Live => finish(next, effects),
                RaceStatus::Finished => {}
                RaceStatus::Upcoming => {
                    return Err(Rejection::InvalidTransition {
                        from: RaceStatus::Upcoming,
                        to: RaceStatus::Finished,
                    });
                }
            },
            OperatorAction::AdvanceTo(round) => {
                let event = self
                    .catalog
                    .get(round)
                    .ok_or(Rejection::UnknownRound(round))?;
                let current = next.active_event.id();
                if round <= current {
                    return Err(Rejection::NotForward {
                        current,
                        requested: round,
                    });
                }
                enter_event(next, event.clone(), RaceStatus::Upcoming, effects);
            }
            OperatorAction::ResetSeason => {
                let event = self.catalog.lookup_next(env.observed_at).clone();
                let status = initial_status(&event, env.observed_at);
                info!(
                    round = event.id().get(),
                    %status,
                    "Resetting season position"
                );
                enter_event(next, event, status, effects);
            }
            OperatorAction::Relocate {
                location,
                coordinates,
            } => {
                let moved = next.active_event.relocated(location, coordinates);
                if moved != next.active_event {
                    next.active_event = moved.clone();
                    next.weather = None;
                    next.weather_observed_at = None;
                    next.feeds.weather = CycleStatus::Pending;
                    effects.push(Effect::PersistEvent(moved));
                }
            }
            OperatorAction::UpdateQualifying(entries) => {
                next.inputs =
                    PredictionInputs::try_new(entries, next.inputs.team_points().clone())
                        .map_err(Rejection::InvalidInputs)?;
            }
            OperatorAction::UpdateTeamPoints(points) => {
                next.inputs = next.inputs.with_team_points(points);
            }
            OperatorAction::SetSession(session) => {
                if session != next.session {
                    next.session = session;
                    next.telemetry = None;
                    next.feeds.telemetry = CycleStatus::Pending;
                    effects.push(Effect::PersistSession(session));
                }
            }
        }
        Ok(())
    }
}

fn go_live(next: &mut RaceState, message: Option<String>, effects: &mut Vec<Effect>) {
    next.status = RaceStatus::Live;
    effects.push(Effect::Notify(Event::RaceLive {
        round: next.active_event.id(),
        name: next.active_event.name().to_string(),
        message,
    }));
}

fn finish(next: &mut RaceState, effects: &mut Vec<Effect>) {
    next.status = RaceStatus::Finished;
    effects.push(Effect::Notify(Event::RaceFinished {
        round: next.active_event.id(),
        name: next.active_event.name().to_string(),
    }));
}

/// Make `event` the active event with per-event data cleared.
fn enter_event(
    next: &mut RaceState,
    event: EventDescriptor,
    status: RaceStatus,
    effects: &mut Vec<Effect>,
) {
    let session = next.session.for_round(event.id());
    let unchanged = event == next.active_event && status == next.status;
    if unchanged {
        return;
    }

    info!(
        from = next.active_event.id().get(),
        to = event.id().get(),
        race = %event.name(),
        "Active event changed"
    );

    next.status = status;
    next.predictions = PredictionSet::empty();
    next.predictions_meta = None;
    next.weather = None;
    next.weather_observed_at = None;
    next.telemetry = None;
    next.feeds.weather = CycleStatus::Pending;
    next.feeds.telemetry = CycleStatus::Pending;
    next.active_event = event.clone();
    effects.push(Effect::PersistEvent(event));
    if session != next.session {
        next.session = session;
        effects.push(Effect::PersistSession(session));
    }
}

/// True when anything other than feed bookkeeping differs.
fn content_differs(before: &RaceState, after: &RaceState) -> bool {
    before.active_event != after.active_event
        || before.status != after.status
        || before.predictions != after.predictions
        || before.connection != after.connection
        || before.weather != after.weather
        || before.telemetry != after.telemetry
        || before.session != after.session
        || before.inputs != after.inputs
}
