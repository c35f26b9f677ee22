//! Engine runtime lifecycle.
//!
//! Starts the coordinator and every producer as named tokio tasks sharing one
//! shutdown signal, and hands back a [`RaceHandle`] for front ends.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::channel::LiveChannel;
use crate::application::clock::EventClock;
use crate::application::coordinator::StateCoordinator;
use crate::application::handle::RaceHandle;
use crate::application::polling::{PollingReconciler, ProbeCycle, TelemetryCycle, WeatherCycle};
use crate::application::refresh::PredictionRefresher;
use crate::domain::RaceState;
use crate::error::Result;
use crate::infrastructure::bootstrap::{Collaborators, ConsoleMode};
use crate::infrastructure::config::settings::Config;

/// A running engine.
pub struct Services {
    pub handle: RaceHandle,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Services {
    /// Wire `collaborators` together and spawn every task.
    ///
    /// # Errors
    ///
    /// Fails when the schedule or prediction inputs in `config` are invalid.
    /// Must be called inside a tokio runtime.
    pub fn start(
        config: &Config,
        collaborators: Collaborators,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<Self> {
        let Collaborators {
            clock,
            push,
            weather,
            telemetry,
            probe,
            geocoder,
            generator,
            store,
            notifiers,
        } = collaborators;

        let catalog = Arc::new(config.catalog()?);
        let now = clock.now();
        let first_round = catalog.lookup_next(now).id();
        let initial = RaceState::initial(
            &catalog,
            now,
            config.session(first_round),
            config.prediction_inputs()?,
        );
        info!(
            round = initial.active_event.id().get(),
            event = %initial.active_event.name(),
            status = %initial.status,
            "Initial race selected"
        );

        let (coordinator, proposals, state_rx) = StateCoordinator::new(
            Arc::clone(&catalog),
            initial,
            Arc::clone(&clock),
            Arc::new(notifiers),
            store,
            config.api.persist_timeout(),
        );

        let mut tasks = Vec::new();
        tasks.push(("coordinator", tokio::spawn(coordinator.run(shutdown.clone()))));

        let ticker = EventClock::new(Arc::clone(&clock), config.clock.tick());
        tasks.push((
            "clock",
            tokio::spawn(ticker.run(state_rx.clone(), proposals.clone(), shutdown.clone())),
        ));

        let channel = LiveChannel::new(
            push,
            Arc::clone(&clock),
            proposals.clone(),
            config.channel.to_settings(),
        );
        tasks.push(("channel", tokio::spawn(channel.run(shutdown.clone()))));

        let mut reconciler = PollingReconciler::new(
            Arc::clone(&clock),
            proposals.clone(),
            state_rx.clone(),
            config.api.request_timeout(),
        );
        if let Some(service) = weather {
            reconciler = reconciler.with_cycle(Arc::new(WeatherCycle::new(
                service,
                config.weather.interval(),
            )));
        }
        if let Some(service) = telemetry {
            reconciler = reconciler.with_cycle(Arc::new(TelemetryCycle::new(
                service,
                config.telemetry.interval(),
            )));
        }
        if let Some(service) = probe {
            reconciler =
                reconciler.with_cycle(Arc::new(ProbeCycle::new(service, config.probe.interval())));
        }
        info!(cycles = reconciler.len(), "Pull cycles configured");
        tasks.extend(
            reconciler
                .spawn(shutdown)
                .into_iter()
                .map(|task| ("poll", task)),
        );

        let refresher = PredictionRefresher::new(
            generator,
            Arc::clone(&clock),
            proposals.clone(),
            state_rx.clone(),
            config.predictions.timeout(),
            shutdown.clone(),
        );
        if let Some(period) = config.predictions.auto_refresh() {
            tasks.push((
                "predictions",
                tokio::spawn(refresher.clone().run_auto(period)),
            ));
        }

        let handle = RaceHandle::new(
            state_rx,
            proposals,
            clock,
            refresher,
            geocoder,
            config.weather.lookup_timeout(),
        );

        Ok(Self { handle, tasks })
    }

    /// Number of spawned tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every task to finish after shutdown was signalled.
    pub async fn join(self) {
        for (name, task) in self.tasks {
            if let Err(err) = task.await {
                warn!(task = name, error = %err, "Task ended abnormally");
            }
        }
        info!("All tasks stopped");
    }
}

/// Run with production collaborators until `shutdown` flips.
pub async fn run_with_shutdown(
    config: Config,
    console: ConsoleMode,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    info!(
        channel = %config.channel.url,
        api = %config.api.url,
        "Starting racewatch"
    );
    let collaborators = Collaborators::from_config(&config, console)?;
    let services = Services::start(&config, collaborators, &shutdown)?;
    services.join().await;
    Ok(())
}
