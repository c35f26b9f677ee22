//! OpenWeather response types (metric units).

use serde::Deserialize;

use crate::domain::{Coordinates, DomainError, WeatherReport};

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherDto {
    pub main: MainDto,
    #[serde(default)]
    pub weather: Vec<ConditionDto>,
    #[serde(default)]
    pub wind: Option<WindDto>,
}

#[derive(Debug, Deserialize)]
pub struct MainDto {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct ConditionDto {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct WindDto {
    pub speed: f64,
}

impl From<CurrentWeatherDto> for WeatherReport {
    fn from(dto: CurrentWeatherDto) -> Self {
        let (description, icon) = dto
            .weather
            .into_iter()
            .next()
            .map(|condition| (condition.description, condition.icon))
            .unwrap_or_default();
        Self {
            temperature: dto.main.temp,
            description,
            wind_speed: dto.wind.map_or(0.0, |wind| wind.speed),
            humidity: dto.main.humidity.clamp(0.0, 100.0).round() as u8,
            icon,
        }
    }
}

/// One geocoding match.
#[derive(Debug, Deserialize)]
pub struct PlaceDto {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

impl PlaceDto {
    pub fn coordinates(&self) -> Result<Coordinates, DomainError> {
        Coordinates::try_new(self.lat, self.lon)
    }
}
