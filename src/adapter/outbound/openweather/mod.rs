//! OpenWeather integration (current conditions and geocoding).

pub mod client;
pub mod dto;

pub use client::{OpenWeatherClient, DEFAULT_BASE_URL};
