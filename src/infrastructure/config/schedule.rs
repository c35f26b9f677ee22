//! `[[schedule]]` entries and the built-in 2025 calendar.

use serde::Deserialize;

use crate::domain::{parse_timestamp, Coordinates, DomainError, EventDescriptor, RoundId};

/// One row of the season calendar as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleEntry {
    pub round: u32,
    pub name: String,
    pub location: String,
    /// Race day, `YYYY-MM-DD`.
    pub date: String,
    /// Start time on race day (UTC).
    #[serde(default = "default_start_time")]
    pub time: String,
    pub lat: f64,
    pub lon: f64,
}

fn default_start_time() -> String {
    "14:00:00".to_string()
}

impl ScheduleEntry {
    fn builtin(round: u32, name: &str, location: &str, date: &str, lat: f64, lon: f64) -> Self {
        Self {
            round,
            name: name.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            time: default_start_time(),
            lat,
            lon,
        }
    }

    /// Validate the row into an event descriptor.
    ///
    /// # Errors
    ///
    /// Fails on round 0, out-of-range coordinates or an unparseable
    /// date/time.
    pub fn to_event(&self) -> Result<EventDescriptor, DomainError> {
        let starts_at = parse_timestamp(&format!("{} {}", self.date.trim(), self.time.trim()))?;
        Ok(EventDescriptor::new(
            RoundId::try_new(self.round)?,
            self.name.clone(),
            self.location.clone(),
            Coordinates::try_new(self.lat, self.lon)?,
            starts_at,
        ))
    }
}

/// The 2025 season.
#[must_use]
pub fn builtin_calendar() -> Vec<ScheduleEntry> {
    [
        (1, "Bahrain Grand Prix", "Sakhir", "2025-03-02", 26.0325, 50.5106),
        (2, "Saudi Arabian Grand Prix", "Jeddah", "2025-03-09", 21.4858, 39.1925),
        (3, "Australian Grand Prix", "Melbourne", "2025-03-16", -37.8497, 144.9680),
        (4, "Japanese Grand Prix", "Suzuka", "2025-04-06", 34.8431, 136.5414),
        (5, "Chinese Grand Prix", "Shanghai", "2025-04-20", 31.3389, 121.2196),
        (6, "Miami Grand Prix", "Miami", "2025-05-04", 25.9581, -80.2389),
        (7, "Emilia Romagna Grand Prix", "Imola", "2025-05-18", 44.3439, 11.7167),
        (8, "Monaco Grand Prix", "Monte Carlo", "2025-05-25", 43.7347, 7.4206),
        (9, "Canadian Grand Prix", "Montreal", "2025-06-15", 45.5048, -73.5522),
        (10, "Spanish Grand Prix", "Barcelona", "2025-06-22", 41.5700, 2.2611),
        (11, "Austrian Grand Prix", "Spielberg", "2025-06-29", 47.2197, 14.7647),
        (12, "British Grand Prix", "Silverstone", "2025-07-06", 52.0786, -1.0169),
        (13, "Hungarian Grand Prix", "Budapest", "2025-07-20", 47.5819, 19.2508),
        (14, "Belgian Grand Prix", "Spa", "2025-07-27", 50.4372, 5.9710),
        (15, "Dutch Grand Prix", "Zandvoort", "2025-08-24", 52.3888, 4.5409),
        (16, "Italian Grand Prix", "Monza", "2025-08-31", 45.6156, 9.2811),
        (17, "Azerbaijan Grand Prix", "Baku", "2025-09-14", 40.4093, 49.8671),
        (18, "Singapore Grand Prix", "Singapore", "2025-09-21", 1.2919, 103.8518),
        (19, "United States Grand Prix", "Austin", "2025-10-05", 30.1339, -97.6411),
        (20, "Mexico City Grand Prix", "Mexico City", "2025-10-19", 19.4063, -99.0907),
        (21, "São Paulo Grand Prix", "São Paulo", "2025-11-02", -23.7036, -46.6997),
        (22, "Las Vegas Grand Prix", "Las Vegas", "2025-11-16", 36.1699, -115.1398),
        (23, "Qatar Grand Prix", "Lusail", "2025-11-23", 25.4211, 51.4904),
        (24, "Abu Dhabi Grand Prix", "Yas Marina", "2025-11-30", 24.4672, 54.6031),
    ]
    .into_iter()
    .map(|(round, name, location, date, lat, lon)| {
        ScheduleEntry::builtin(round, name, location, date, lat, lon)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScheduleCatalog;
    use chrono::{TimeZone, Utc};

    #[test]
    fn builtin_calendar_is_a_valid_catalog() {
        let events: Vec<_> = builtin_calendar()
            .iter()
            .map(ScheduleEntry::to_event)
            .collect::<Result<_, _>>()
            .unwrap();
        let catalog = ScheduleCatalog::try_new(events).unwrap();

        assert_eq!(catalog.len(), 24);
        let montreal = catalog.get(RoundId::try_new(9).unwrap()).unwrap();
        assert_eq!(montreal.location(), "Montreal");
        assert_eq!(
            montreal.starts_at(),
            Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn start_time_defaults_to_fourteen_hundred() {
        let entry: ScheduleEntry = toml::from_str(
            r#"
round = 3
name = "Test GP"
location = "Nowhere"
date = "2025-04-01"
lat = 0.0
lon = 0.0
"#,
        )
        .unwrap();
        assert_eq!(entry.time, "14:00:00");
        assert_eq!(
            entry.to_event().unwrap().starts_at(),
            Utc.with_ymd_and_hms(2025, 4, 1, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn bad_rows_are_rejected() {
        let mut entry = builtin_calendar().remove(0);
        entry.round = 0;
        assert!(matches!(
            entry.to_event(),
            Err(DomainError::InvalidRound { value: 0 })
        ));

        let mut entry = builtin_calendar().remove(0);
        entry.date = "March 2nd".into();
        assert!(matches!(
            entry.to_event(),
            Err(DomainError::InvalidTimestamp { .. })
        ));
    }
}
