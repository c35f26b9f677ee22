use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::watch;

use racewatch::application::handle::RaceHandle;
use racewatch::domain::RaceState;
use racewatch::infrastructure::bootstrap::Collaborators;
use racewatch::infrastructure::config::settings::Config;
use racewatch::infrastructure::orchestration::Services;
use racewatch::port::{
    Geocoder, HealthProbe, NotifierRegistry, NullGeocoder, PredictionGenerator, RaceView,
    TelemetryService, WeatherService,
};
use racewatch::testkit::clock::ManualClock;
use racewatch::testkit::config as test_config;
use racewatch::testkit::domain as fixtures;
use racewatch::testkit::services::{GatedGenerator, RecordingConfigStore};
use racewatch::testkit::stream::{channel_push_stream, ChannelPushHandle};

use super::recording_notifier::RecordingNotifier;

/// How long a test waits for the engine to reach an expected state.
pub const WAIT: Duration = Duration::from_secs(3);

/// Builder for an engine wired to testkit collaborators.
pub struct EngineBuilder {
    config: Config,
    now: DateTime<Utc>,
    weather: Option<Arc<dyn WeatherService>>,
    telemetry: Option<Arc<dyn TelemetryService>>,
    probe: Option<Arc<dyn HealthProbe>>,
    geocoder: Arc<dyn Geocoder>,
    generator: Arc<dyn PredictionGenerator>,
}

impl EngineBuilder {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            config: test_config::engine(),
            now,
            weather: None,
            telemetry: None,
            probe: None,
            geocoder: Arc::new(NullGeocoder),
            generator: Arc::new(GatedGenerator::new(fixtures::prediction_set(&["VER"]))),
        }
    }

    pub fn weather(mut self, service: impl WeatherService + 'static) -> Self {
        self.weather = Some(Arc::new(service));
        self
    }

    pub fn telemetry(mut self, service: impl TelemetryService + 'static) -> Self {
        self.telemetry = Some(Arc::new(service));
        self
    }

    pub fn probe(mut self, service: impl HealthProbe + 'static) -> Self {
        self.probe = Some(Arc::new(service));
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn PredictionGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn start(self) -> TestEngine {
        let clock = Arc::new(ManualClock::new(self.now));
        let (stream, push) = channel_push_stream(16);
        let store = RecordingConfigStore::new();
        let notifier = RecordingNotifier::new();
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(notifier.clone()));

        let collaborators = Collaborators {
            clock: clock.clone(),
            push: Box::new(stream),
            weather: self.weather,
            telemetry: self.telemetry,
            probe: self.probe,
            geocoder: self.geocoder,
            generator: self.generator,
            store: store.clone(),
            notifiers,
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let services =
            Services::start(&self.config, collaborators, &shutdown_rx).expect("engine starts");

        TestEngine {
            handle: services.handle.clone(),
            clock,
            push,
            notifier,
            store,
            shutdown,
            services,
        }
    }
}

/// A running engine plus handles on every collaborator.
pub struct TestEngine {
    pub handle: RaceHandle,
    pub clock: Arc<ManualClock>,
    pub push: ChannelPushHandle,
    pub notifier: RecordingNotifier,
    pub store: Arc<RecordingConfigStore>,
    shutdown: watch::Sender<bool>,
    services: Services,
}

impl TestEngine {
    /// Wait until a committed state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        what: &str,
        mut predicate: impl FnMut(&RaceState) -> bool,
    ) -> RaceState {
        let mut updates = self.handle.subscribe();
        let outcome = tokio::time::timeout(WAIT, async {
            updates
                .wait_for(|state| predicate(state))
                .await
                .map(|state| state.clone())
        })
        .await;
        match outcome {
            Ok(Ok(state)) => state,
            _ => panic!(
                "timed out waiting for {what}; last state: {:?}",
                self.handle.snapshot()
            ),
        }
    }

    /// Wait until the push channel reports a connection.
    pub async fn connected(&self) -> RaceState {
        self.wait_for("push connection", |state| state.connection.is_connected())
            .await
    }

    /// Let a few clock ticks pass.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(80)).await;
    }

    /// Signal shutdown and wait for every task to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        tokio::time::timeout(WAIT, self.services.join())
            .await
            .expect("all tasks stop after shutdown");
    }
}
