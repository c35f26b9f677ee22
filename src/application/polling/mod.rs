//! Independent periodic pull cycles.
//!
//! Each cycle runs in its own task with its own period and timeout. A failing
//! or slow cycle only ever affects its own feed health.

mod cycles;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

pub use cycles::{ProbeCycle, TelemetryCycle, WeatherCycle};

use super::proposal::{PollOutcome, Proposal, ProposalSender, UpdateEnvelope};
use super::shutdown;
use crate::domain::{FeedKind, RaceState, SourceKind};
use crate::error::Result;
use crate::port::Clock;

/// One kind of periodic request.
#[async_trait]
pub trait PollCycle: Send + Sync {
    fn feed(&self) -> FeedKind;

    fn period(&self) -> Duration;

    /// Fetch once, using the committed state to decide what to ask for.
    async fn poll(&self, state: &RaceState) -> Result<PollOutcome>;

    /// Whether a commit from `previous` to `current` warrants polling now
    /// instead of waiting for the next period.
    fn wants_early_poll(&self, _previous: &RaceState, _current: &RaceState) -> bool {
        false
    }
}

pub struct PollingReconciler {
    cycles: Vec<Arc<dyn PollCycle>>,
    clock: Arc<dyn Clock>,
    proposals: ProposalSender,
    state: watch::Receiver<RaceState>,
    request_timeout: Duration,
}

impl PollingReconciler {
    pub fn new(
        clock: Arc<dyn Clock>,
        proposals: ProposalSender,
        state: watch::Receiver<RaceState>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            cycles: Vec::new(),
            clock,
            proposals,
            state,
            request_timeout,
        }
    }

    #[must_use]
    pub fn with_cycle(mut self, cycle: Arc<dyn PollCycle>) -> Self {
        self.cycles.push(cycle);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Start one task per cycle.
    pub fn spawn(self, shutdown: &watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.cycles
            .into_iter()
            .map(|cycle| {
                let runner = CycleRunner {
                    cycle,
                    clock: Arc::clone(&self.clock),
                    proposals: self.proposals.clone(),
                    state: self.state.clone(),
                    request_timeout: self.request_timeout,
                };
                tokio::spawn(runner.run(shutdown.clone()))
            })
            .collect()
    }
}

struct CycleRunner {
    cycle: Arc<dyn PollCycle>,
    clock: Arc<dyn Clock>,
    proposals: ProposalSender,
    state: watch::Receiver<RaceState>,
    request_timeout: Duration,
}

impl CycleRunner {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let feed = self.cycle.feed();
        let period = self.cycle.period();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut seen = self.state.borrow_and_update().clone();
        info!(%feed, period_ms = period.as_millis() as u64, "Poll cycle started");

        loop {
            tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                _ = ticker.tick() => {}
                changed = self.state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = self.state.borrow_and_update().clone();
                    let early = self.cycle.wants_early_poll(&seen, &current);
                    seen = current;
                    if !early {
                        continue;
                    }
                    debug!(%feed, "Polling early after state change");
                    ticker.reset();
                }
            }

            let snapshot = self.state.borrow().clone();
            let limit = self.request_timeout;
            let attempt = tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                result = timeout(limit, self.cycle.poll(&snapshot)) => result,
            };
            let outcome = match attempt {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    warn!(%feed, error = %err, "Poll failed");
                    PollOutcome::Failed { feed }
                }
                Err(_) => {
                    warn!(%feed, timeout_ms = limit.as_millis() as u64, "Poll timed out");
                    PollOutcome::Failed { feed }
                }
            };

            let envelope = UpdateEnvelope::new(SourceKind::Poll(feed), outcome, self.clock.now());
            if self.proposals.propose(Proposal::Poll(envelope)).await.is_err() {
                debug!(%feed, "Coordinator gone, stopping poll cycle");
                break;
            }
        }

        info!(%feed, "Poll cycle stopped");
    }
}
