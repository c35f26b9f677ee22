use serde::{Deserialize, Serialize};

/// Current conditions at a venue, in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    pub description: String,
    /// Wind speed in metres per second.
    pub wind_speed: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Provider icon reference (for example `01d`).
    pub icon: String,
}
