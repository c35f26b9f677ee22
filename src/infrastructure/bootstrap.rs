//! Infrastructure bootstrap helpers for runtime wiring.
//!
//! Turns a [`Config`] into the concrete collaborators the engine is started
//! with. Tests build [`Collaborators`] by hand from the testkit instead.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::notifier::ConsoleNotifier;
use crate::adapter::outbound::openweather::OpenWeatherClient;
use crate::adapter::outbound::predictor::GridPredictor;
use crate::adapter::outbound::race_server::{RaceServerClient, WebSocketPushStream};
use crate::error::Result;
use crate::infrastructure::config::polling::WEATHER_KEY_ENV;
use crate::infrastructure::config::settings::Config;
use crate::port::{
    Clock, ConfigStore, Geocoder, HealthProbe, LogNotifier, NotifierRegistry, NullGeocoder,
    PredictionGenerator, PushStream, SystemClock, TelemetryService, WeatherService,
};

/// Everything the engine talks to.
///
/// `None` for a pull service means its cycle is not started.
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub push: Box<dyn PushStream>,
    pub weather: Option<Arc<dyn WeatherService>>,
    pub telemetry: Option<Arc<dyn TelemetryService>>,
    pub probe: Option<Arc<dyn HealthProbe>>,
    pub geocoder: Arc<dyn Geocoder>,
    pub generator: Arc<dyn PredictionGenerator>,
    pub store: Arc<dyn ConfigStore>,
    pub notifiers: NotifierRegistry,
}

/// How transitions are announced on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    Off,
    Text,
    Json,
}

impl Collaborators {
    /// Production collaborators for `config`.
    ///
    /// # Errors
    ///
    /// Fails when an endpoint URL cannot be used to build a client.
    pub fn from_config(config: &Config, console: ConsoleMode) -> Result<Self> {
        let race_server = Arc::new(RaceServerClient::new(
            &config.api.url,
            config.api.http_settings(),
        )?);
        let (weather, geocoder) = build_weather(config)?;

        Ok(Self {
            clock: Arc::new(SystemClock),
            push: Box::new(WebSocketPushStream::new(config.channel.url.clone())),
            weather,
            telemetry: config
                .telemetry
                .enabled
                .then(|| Arc::clone(&race_server) as Arc<dyn TelemetryService>),
            probe: config
                .probe
                .enabled
                .then(|| Arc::clone(&race_server) as Arc<dyn HealthProbe>),
            geocoder,
            generator: build_generator(config),
            store: race_server,
            notifiers: build_notifier_registry(console),
        })
    }
}

/// Weather service and geocoder, both backed by OpenWeather when a key is set.
#[allow(clippy::type_complexity)]
pub(crate) fn build_weather(
    config: &Config,
) -> Result<(Option<Arc<dyn WeatherService>>, Arc<dyn Geocoder>)> {
    let Some(key) = config.weather.active_key() else {
        if config.weather.enabled {
            warn!(
                env = WEATHER_KEY_ENV,
                "No OpenWeather key set; weather and relocation lookups disabled"
            );
        }
        let geocoder: Arc<dyn Geocoder> = Arc::new(NullGeocoder);
        return Ok((None, geocoder));
    };

    let client = Arc::new(OpenWeatherClient::new(
        &config.weather.url,
        key,
        config.api.http_settings(),
    )?);
    info!(url = %config.weather.url, "Weather service enabled");
    let weather: Arc<dyn WeatherService> = client.clone();
    let geocoder: Arc<dyn Geocoder> = client;
    Ok((Some(weather), geocoder))
}

pub(crate) fn build_generator(config: &Config) -> Arc<dyn PredictionGenerator> {
    Arc::new(GridPredictor::new(config.predictions.weights()))
}

/// Build notifier registry: tracing always, the terminal when asked.
pub(crate) fn build_notifier_registry(console: ConsoleMode) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    match console {
        ConsoleMode::Off => {}
        ConsoleMode::Text => registry.register(Box::new(ConsoleNotifier::new(false))),
        ConsoleMode::Json => registry.register(Box::new(ConsoleNotifier::new(true))),
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_without_key_uses_null_geocoder() {
        let config = Config::default();
        let (weather, _geocoder) = build_weather(&config).unwrap();
        assert!(weather.is_none());
    }

    #[test]
    fn weather_with_key_is_enabled() {
        let mut config = Config::default();
        config.weather.api_key = Some("key".into());
        let (weather, _geocoder) = build_weather(&config).unwrap();
        assert!(weather.is_some());
    }

    #[test]
    fn console_mode_adds_a_notifier() {
        assert_eq!(build_notifier_registry(ConsoleMode::Off).len(), 1);
        assert_eq!(build_notifier_registry(ConsoleMode::Text).len(), 2);
    }

    #[tokio::test]
    async fn disabled_pull_services_are_left_out() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        let collaborators = Collaborators::from_config(&config, ConsoleMode::Off).unwrap();
        assert!(collaborators.telemetry.is_none());
        assert!(collaborators.probe.is_some());
        assert_eq!(collaborators.push.endpoint(), "ws://localhost:8000/ws");
    }
}
