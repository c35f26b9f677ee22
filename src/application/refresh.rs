//! Prediction refresh requests with single-flight protection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::proposal::{Proposal, ProposalSender, UpdateEnvelope};
use super::shutdown;
use crate::domain::{RaceState, RaceStatus, SourceKind};
use crate::error::Error;
use crate::port::{Clock, PredictionGenerator, RefreshOutcome};

/// Allows at most one refresh in flight.
#[derive(Debug, Clone, Default)]
pub struct RefreshGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a refresh; releases the gate on drop.
#[derive(Debug)]
pub struct RefreshPermit {
    busy: Arc<AtomicBool>,
}

impl RefreshGate {
    #[must_use]
    pub fn try_acquire(&self) -> Option<RefreshPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for RefreshPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Runs the prediction generator on request and on a timer while live.
#[derive(Clone)]
pub struct PredictionRefresher {
    generator: Arc<dyn PredictionGenerator>,
    clock: Arc<dyn Clock>,
    proposals: ProposalSender,
    state: watch::Receiver<RaceState>,
    gate: RefreshGate,
    request_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl PredictionRefresher {
    pub fn new(
        generator: Arc<dyn PredictionGenerator>,
        clock: Arc<dyn Clock>,
        proposals: ProposalSender,
        state: watch::Receiver<RaceState>,
        request_timeout: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            generator,
            clock,
            proposals,
            state,
            gate: RefreshGate::default(),
            request_timeout,
            shutdown,
        }
    }

    /// Start a refresh in the background unless one is already running.
    ///
    /// A refresh still running at shutdown is abandoned without proposing.
    pub fn request(&self) -> RefreshOutcome {
        let Some(permit) = self.gate.try_acquire() else {
            debug!("Prediction refresh already in flight");
            return RefreshOutcome::Skipped;
        };

        let inputs = self.state.borrow().inputs.clone();
        let generator = Arc::clone(&self.generator);
        let clock = Arc::clone(&self.clock);
        let proposals = self.proposals.clone();
        let limit = self.request_timeout;
        let mut stop = self.shutdown.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let generated = tokio::select! {
                biased;
                () = shutdown::signalled(&mut stop) => {
                    debug!(generator = generator.name(), "Prediction refresh abandoned at shutdown");
                    return;
                }
                result = timeout(limit, generator.generate(&inputs)) => result,
            };
            match generated {
                Ok(Ok(_)) if *stop.borrow() => {
                    debug!("Shutdown signalled, dropping generated predictions");
                }
                Ok(Ok(predictions)) => {
                    debug!(
                        generator = generator.name(),
                        entries = predictions.len(),
                        "Predictions generated"
                    );
                    let envelope =
                        UpdateEnvelope::new(SourceKind::Generator, predictions, clock.now());
                    if proposals.propose(Proposal::Predictions(envelope)).await.is_err() {
                        debug!("Coordinator gone, dropping generated predictions");
                    }
                }
                Ok(Err(Error::Busy(name))) => {
                    debug!(generator = name, "Prediction generator busy");
                }
                Ok(Err(err)) => {
                    warn!(generator = generator.name(), error = %err, "Prediction refresh failed");
                }
                Err(_) => {
                    warn!(
                        generator = generator.name(),
                        timeout_ms = limit.as_millis() as u64,
                        "Prediction refresh timed out"
                    );
                }
            }
        });

        RefreshOutcome::Started
    }

    /// Request a refresh every `period` while the race is live and a
    /// prediction set exists.
    pub async fn run_auto(self, period: Duration) {
        let mut shutdown = self.shutdown.clone();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Automatic prediction refresh started");

        loop {
            tokio::select! {
                biased;
                () = shutdown::signalled(&mut shutdown) => break,
                _ = ticker.tick() => {
                    let due = {
                        let state = self.state.borrow();
                        state.status == RaceStatus::Live && !state.predictions.is_empty()
                    };
                    if due && self.request() == RefreshOutcome::Skipped {
                        debug!("Skipping automatic refresh tick");
                    }
                }
            }
        }

        info!("Automatic prediction refresh stopped");
    }
}
