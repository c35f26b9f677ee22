//! Builders for domain values used across tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{
    Coordinates, EventDescriptor, Prediction, PredictionSet, RoundId, ScheduleCatalog,
    SessionKey, SessionKind, WeatherReport,
};

/// Start of round 9, 2025-06-15 14:00 UTC.
pub fn round_nine_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap()
}

pub fn round(id: u32) -> RoundId {
    RoundId::try_new(id).unwrap()
}

pub fn event(id: u32, name: &str, location: &str, starts_at: DateTime<Utc>) -> EventDescriptor {
    EventDescriptor::new(
        round(id),
        name,
        location,
        Coordinates::try_new(45.5048, -73.5522).unwrap(),
        starts_at,
    )
}

/// Three rounds: 8 a week before round 9, 10 two weeks after it.
pub fn catalog() -> ScheduleCatalog {
    let nine = round_nine_start();
    ScheduleCatalog::try_new(vec![
        event(8, "Monaco Grand Prix", "Monte Carlo", nine - Duration::days(7)),
        event(9, "Canadian Grand Prix", "Montreal", nine),
        event(10, "Spanish Grand Prix", "Barcelona", nine + Duration::days(14)),
    ])
    .unwrap()
}

/// Race session for round 9 of 2025.
pub fn session() -> SessionKey {
    SessionKey::new(2025, round(9), SessionKind::Race)
}

/// Predictions in the given finishing order, qualifying in the same order.
pub fn prediction_set(drivers: &[&str]) -> PredictionSet {
    let entries = drivers
        .iter()
        .enumerate()
        .map(|(index, driver)| {
            let position = index as u32 + 1;
            let win = if index == 0 { 40.0 } else { 10.0 };
            Prediction::try_new(*driver, "Team", position, position, 80.0, win).unwrap()
        })
        .collect();
    PredictionSet::try_new(entries).unwrap()
}

pub fn weather(description: &str) -> WeatherReport {
    WeatherReport {
        temperature: 21.0,
        description: description.to_string(),
        wind_speed: 3.0,
        humidity: 60,
        icon: "01d".to_string(),
    }
}
