//! State coordinator: the single writer of [`RaceState`].
//!
//! Every proposal funnels through one mpsc queue. The commit step is
//! synchronous; notifications run inline and persistence is spawned with a
//! timeout so a slow store never stalls the queue.

pub mod ledger;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use self::ledger::{Effect, RaceLedger};
use super::proposal::{ProposalSender, Submission};
use super::shutdown;
use crate::domain::{RaceState, ScheduleCatalog};
use crate::port::{Clock, ConfigStore, NotifierRegistry};

/// Proposals buffered before producers start waiting.
const INBOX_CAPACITY: usize = 256;

pub struct StateCoordinator {
    ledger: RaceLedger,
    clock: Arc<dyn Clock>,
    publisher: watch::Sender<RaceState>,
    notifiers: Arc<NotifierRegistry>,
    store: Arc<dyn ConfigStore>,
    persist_timeout: Duration,
    inbox: mpsc::Receiver<Submission>,
}

impl StateCoordinator {
    /// Create the coordinator with the initial state for `clock.now()`.
    ///
    /// Returns the coordinator, the sender producers submit through and a
    /// receiver of committed state.
    pub fn new(
        catalog: Arc<ScheduleCatalog>,
        initial: RaceState,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
        store: Arc<dyn ConfigStore>,
        persist_timeout: Duration,
    ) -> (Self, ProposalSender, watch::Receiver<RaceState>) {
        let (tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (publisher, state_rx) = watch::channel(initial.clone());
        let coordinator = Self {
            ledger: RaceLedger::new(initial, catalog),
            clock,
            publisher,
            notifiers,
            store,
            persist_timeout,
            inbox,
        };
        (coordinator, ProposalSender::new(tx), state_rx)
    }

    /// Apply one submission and publish the result.
    pub fn commit(&mut self, submission: Submission) {
        let Submission { proposal, reply } = submission;
        let source = proposal.source();
        let result = self.ledger.apply(proposal, self.clock.now());

        if let Some(rejection) = &result.rejection {
            warn!(%source, reason = %rejection, "Proposal rejected");
        }

        if result.changed {
            let state = self.ledger.state().clone();
            debug!(
                %source,
                round = state.active_event.id().get(),
                status = %state.status,
                "Committed"
            );
            self.publisher.send_replace(state);
        }

        for effect in result.effects {
            self.run_effect(effect);
        }

        if let Some(reply) = reply {
            let decision = match result.rejection {
                Some(rejection) => Err(rejection),
                None => Ok(result.changed),
            };
            // The requester may have given up waiting.
            let _ = reply.send(decision);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Notify(event) => self.notifiers.notify_all(event),
            Effect::PersistEvent(event) => {
                let store = Arc::clone(&self.store);
                let limit = self.persist_timeout;
                tokio::spawn(async move {
                    match tokio::time::timeout(limit, store.put_race(&event)).await {
                        Ok(Ok(())) => debug!(round = event.id().get(), "Race config persisted"),
                        Ok(Err(err)) => warn!(error = %err, "Failed to persist race config"),
                        Err(_) => warn!(
                            timeout_ms = limit.as_millis() as u64,
                            "Persisting race config timed out"
                        ),
                    }
                });
            }
            Effect::PersistSession(session) => {
                let store = Arc::clone(&self.store);
                let limit = self.persist_timeout;
                tokio::spawn(async move {
                    match tokio::time::timeout(limit, store.put_session(&session)).await {
                        Ok(Ok(())) => debug!(%session, "Session persisted"),
                        Ok(Err(err)) => warn!(error = %err, "Failed to persist session"),
                        Err(_) => warn!(
                            timeout_ms = limit.as_millis() as u64,
                            "Persisting session timed out"
                        ),
                    }
                });
            }
        }
    }

    /// Commit proposals until shutdown or until every sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            round = self.ledger.state().active_event.id().get(),
            status = %self.ledger.state().status,
            "State coordinator started"
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                submission = self.inbox.recv() => {
                    let Some(submission) = submission else {
                        debug!("All proposal senders dropped");
                        break;
                    };
                    self.commit(submission);
                }
            }
        }

        self.inbox.close();
        info!("State coordinator stopped");
    }
}
