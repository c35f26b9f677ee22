//! Stub collaborators for the pull cycles, prediction refresh and config
//! persistence.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{
    Coordinates, EventDescriptor, LapSummary, PredictionInputs, PredictionSet, SessionKey,
    TelemetryReport, WeatherReport,
};
use crate::error::{Error, Result};
use crate::port::{
    ConfigStore, Geocoder, HealthProbe, PredictionGenerator, TelemetryService, WeatherService,
};

fn unavailable(service: &'static str) -> Error {
    Error::Unavailable {
        service,
        reason: "stubbed failure".into(),
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Weather stub answering from a script, then repeating the fallback.
pub struct StubWeather {
    script: Mutex<VecDeque<Option<WeatherReport>>>,
    fallback: Option<WeatherReport>,
    delay: Duration,
    calls: AtomicU32,
}

impl StubWeather {
    /// Always returns `report`.
    pub fn always(report: WeatherReport) -> Self {
        Self::scripted(Vec::new(), Some(report))
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self::scripted(Vec::new(), None)
    }

    /// Pops one scripted answer per call (`None` is a failure), then uses
    /// `fallback`.
    pub fn scripted(script: Vec<Option<WeatherReport>>, fallback: Option<WeatherReport>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherService for StubWeather {
    async fn current(&self, _at: Coordinates) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
            .ok_or_else(|| unavailable("weather"))
    }
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

pub struct StubTelemetry {
    report: Option<TelemetryReport>,
    calls: AtomicU32,
}

impl StubTelemetry {
    pub fn with(report: TelemetryReport) -> Self {
        Self {
            report: Some(report),
            calls: AtomicU32::new(0),
        }
    }

    /// Reports `laps` laps and no running order.
    pub fn laps(laps: u32) -> Self {
        Self::with(TelemetryReport {
            laps: LapSummary {
                lap_count: laps,
                leader_lap: Some(laps),
            },
            predictions: None,
        })
    }

    pub fn failing() -> Self {
        Self {
            report: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryService for StubTelemetry {
    async fn fetch(&self, _session: &SessionKey) -> Result<TelemetryReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.report.clone().ok_or_else(|| unavailable("telemetry"))
    }
}

// ---------------------------------------------------------------------------
// Geocoder and probe
// ---------------------------------------------------------------------------

/// Geocoder returning a fixed answer for every query.
pub struct StubGeocoder {
    answer: Option<Coordinates>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn found(at: Coordinates) -> Self {
        Self {
            answer: Some(at),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn nothing() -> Self {
        Self {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>> {
        self.queries.lock().push(query.to_string());
        Ok(self.answer)
    }
}

pub struct StubProbe {
    healthy: bool,
}

impl StubProbe {
    pub const fn healthy() -> Self {
        Self { healthy: true }
    }

    pub const fn down() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl HealthProbe for StubProbe {
    async fn check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(unavailable("probe"))
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction generator
// ---------------------------------------------------------------------------

/// Generator that blocks until released, so tests control overlap.
///
/// Each [`release`](Self::release) lets exactly one pending or future call
/// finish.
pub struct GatedGenerator {
    output: PredictionSet,
    gate: Notify,
    calls: AtomicU32,
}

impl GatedGenerator {
    pub fn new(output: PredictionSet) -> Self {
        Self {
            output,
            gate: Notify::new(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionGenerator for GatedGenerator {
    async fn generate(&self, _inputs: &PredictionInputs) -> Result<PredictionSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.output.clone())
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

// ---------------------------------------------------------------------------
// Config store
// ---------------------------------------------------------------------------

/// Records every write.
#[derive(Default)]
pub struct RecordingConfigStore {
    races: Mutex<Vec<EventDescriptor>>,
    sessions: Mutex<Vec<SessionKey>>,
}

impl RecordingConfigStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn races(&self) -> Vec<EventDescriptor> {
        self.races.lock().clone()
    }

    pub fn sessions(&self) -> Vec<SessionKey> {
        self.sessions.lock().clone()
    }
}

#[async_trait]
impl ConfigStore for RecordingConfigStore {
    async fn put_race(&self, event: &EventDescriptor) -> Result<()> {
        self.races.lock().push(event.clone());
        Ok(())
    }

    async fn put_session(&self, session: &SessionKey) -> Result<()> {
        self.sessions.lock().push(*session);
        Ok(())
    }
}
