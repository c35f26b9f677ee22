//! Scheduled event descriptors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::RoundId;
use super::status::RaceStatus;

/// Geographic position of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the WGS84 ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One entry of the season schedule.
///
/// Descriptors read from the catalog are never modified; the coordinator
/// keeps its own copy of the active event and replaces it wholesale when the
/// operator relocates the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    id: RoundId,
    name: String,
    location: String,
    coordinates: Coordinates,
    starts_at: DateTime<Utc>,
    status: RaceStatus,
}

impl EventDescriptor {
    /// Create an upcoming event.
    pub fn new(
        id: RoundId,
        name: impl Into<String>,
        location: impl Into<String>,
        coordinates: Coordinates,
        starts_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            coordinates,
            starts_at,
            status: RaceStatus::Upcoming,
        }
    }

    /// Set the status recorded with the descriptor.
    #[must_use]
    pub fn with_status(mut self, status: RaceStatus) -> Self {
        self.status = status;
        self
    }

    /// Copy of this event at a different venue.
    #[must_use]
    pub fn relocated(&self, location: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            location: location.into(),
            coordinates,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn id(&self) -> RoundId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Status as published by the schedule source. Informational only; the
    /// committed race state carries the authoritative status.
    #[must_use]
    pub const fn status(&self) -> RaceStatus {
        self.status
    }

    /// True once `now` has reached the scheduled start.
    #[must_use]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }
}

/// Parse the timestamp layouts used by schedule files and race servers.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS[.fff]` and a
/// bare `YYYY-MM-DD` (midnight). Layouts without an offset are read as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, DomainError> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(DomainError::InvalidTimestamp {
        value: text.to_string(),
    })
}
