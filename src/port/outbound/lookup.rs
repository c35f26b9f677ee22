//! Request/response collaborators polled by the reconciler.

use async_trait::async_trait;

use crate::domain::{Coordinates, SessionKey, TelemetryReport, WeatherReport};
use crate::error::Error;

/// Current weather for a position.
#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current(&self, at: Coordinates) -> Result<WeatherReport, Error>;
}

/// Free-text location search.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// First match for `query`, or `None` when nothing matched.
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>, Error>;
}

/// Live timing data for a session.
#[async_trait]
pub trait TelemetryService: Send + Sync {
    async fn fetch(&self, session: &SessionKey) -> Result<TelemetryReport, Error>;
}

/// Liveness check against the race server.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `Ok` when the server reports itself operational.
    async fn check(&self) -> Result<(), Error>;
}

/// Geocoder used when no lookup service is configured; never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn locate(&self, _query: &str) -> Result<Option<Coordinates>, Error> {
        Ok(None)
    }
}
