//! OpenWeather REST client for current conditions and geocoding.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::dto::{CurrentWeatherDto, PlaceDto};
use crate::adapter::outbound::http::{HttpSettings, JsonHttp};
use crate::domain::{Coordinates, WeatherReport};
use crate::error::Result;
use crate::port::{Geocoder, WeatherService};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather client. The API key never appears in logs.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: JsonHttp,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, settings: HttpSettings) -> Result<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            http: JsonHttp::new(settings),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn weather_url(&self, at: Coordinates) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/data/2.5/weather", self.base_url),
            &[
                ("lat", at.latitude().to_string()),
                ("lon", at.longitude().to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )?;
        Ok(url)
    }

    fn geocode_url(&self, query: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/geo/1.0/direct", self.base_url),
            &[
                ("q", query),
                ("limit", "1"),
                ("appid", self.api_key.as_str()),
            ],
        )?;
        Ok(url)
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current(&self, at: Coordinates) -> Result<WeatherReport> {
        let url = self.weather_url(at)?;
        let dto: CurrentWeatherDto = self.http.get(url.as_str()).await?;
        let report = WeatherReport::from(dto);
        debug!(
            latitude = at.latitude(),
            longitude = at.longitude(),
            temperature = report.temperature,
            "Fetched weather"
        );
        Ok(report)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    async fn locate(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = self.geocode_url(query)?;
        let places: Vec<PlaceDto> = self.http.get(url.as_str()).await?;
        let Some(place) = places.first() else {
            return Ok(None);
        };
        debug!(query, name = %place.name, country = ?place.country, "Geocoded location");
        Ok(Some(place.coordinates()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenWeatherClient {
        OpenWeatherClient::new(DEFAULT_BASE_URL, "secret", HttpSettings::default()).unwrap()
    }

    #[test]
    fn weather_url_uses_metric_units() {
        let at = Coordinates::try_new(45.5, -73.5).unwrap();
        let url = client().weather_url(at).unwrap();
        assert_eq!(url.path(), "/data/2.5/weather");
        let query = url.query().unwrap();
        assert!(query.contains("lat=45.5"));
        assert!(query.contains("lon=-73.5"));
        assert!(query.contains("units=metric"));
    }

    #[test]
    fn geocode_url_encodes_query() {
        let url = client().geocode_url("São Paulo").unwrap();
        assert_eq!(url.path(), "/geo/1.0/direct");
        assert!(url.query().unwrap().contains("limit=1"));
        let q = url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());
        assert_eq!(q.as_deref(), Some("São Paulo"));
    }

    #[test]
    fn debug_hides_api_key() {
        assert!(!format!("{:?}", client()).contains("secret"));
    }
}
