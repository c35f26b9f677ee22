//! Race server REST client.
//!
//! One client serves three ports: live telemetry (`/live/laps` plus
//! `/live/predictions`), the health probe (`/status`) and config persistence
//! (`/config/race`, `/live/session`).

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use super::dto::{
    to_prediction_set, LapsDto, LivePredictionsDto, RaceConfigDto, ServerReply, ServerStatusDto,
    SessionDto,
};
use crate::adapter::outbound::http::{HttpSettings, JsonHttp};
use crate::domain::{EventDescriptor, SessionKey, TelemetryReport};
use crate::error::{Error, Result};
use crate::port::{ConfigStore, HealthProbe, TelemetryService};

const SERVICE: &str = "race server";

/// HTTP client for the race server API.
#[derive(Debug, Clone)]
pub struct RaceServerClient {
    http: JsonHttp,
    base_url: String,
}

impl RaceServerClient {
    /// Create a client for `base_url` (for example `http://localhost:8000`).
    pub fn new(base_url: &str, settings: HttpSettings) -> Result<Self> {
        // Validate once so request building only fails on bad parameters.
        Url::parse(base_url)?;
        Ok(Self {
            http: JsonHttp::new(settings),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn session_url(&self, path: &str, session: &SessionKey) -> Result<Url> {
        let url = Url::parse_with_params(
            &self.endpoint(path),
            &[
                ("year", session.season.to_string()),
                ("round", session.round.get().to_string()),
                ("session", session.kind.code().to_string()),
            ],
        )?;
        Ok(url)
    }

    async fn get_reply<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.http.get::<ServerReply<T>>(url).await? {
            ServerReply::Success(payload) => Ok(payload),
            ServerReply::Failure { error } => Err(Error::Unavailable {
                service: SERVICE,
                reason: error,
            }),
        }
    }
}

#[async_trait]
impl TelemetryService for RaceServerClient {
    async fn fetch(&self, session: &SessionKey) -> Result<TelemetryReport> {
        let laps_url = self.session_url("live/laps", session)?;
        let predictions_url = self.session_url("live/predictions", session)?;

        let (laps, predictions) = tokio::join!(
            self.get_reply::<LapsDto>(laps_url.as_str()),
            self.get_reply::<LivePredictionsDto>(predictions_url.as_str()),
        );

        let laps = laps?.summary();
        // The running order is optional; laps alone make a successful poll.
        let predictions = match predictions {
            Ok(dto) if dto.predictions.is_empty() => None,
            Ok(dto) => match to_prediction_set(&dto.predictions) {
                Ok(set) => Some(set),
                Err(reason) => {
                    debug!(reason = %reason, "Discarding live running order");
                    None
                }
            },
            Err(err) => {
                debug!(error = %err, "Live running order unavailable");
                None
            }
        };

        debug!(
            %session,
            lap_count = laps.lap_count,
            running_order = predictions.is_some(),
            "Fetched telemetry"
        );
        Ok(TelemetryReport { laps, predictions })
    }
}

#[async_trait]
impl HealthProbe for RaceServerClient {
    async fn check(&self) -> Result<()> {
        let status: ServerStatusDto = self.http.get(&self.endpoint("status")).await?;
        if status.status == "operational" {
            debug!(
                active_connections = status.active_connections,
                "Race server operational"
            );
            Ok(())
        } else {
            Err(Error::Unavailable {
                service: SERVICE,
                reason: format!("status is '{}'", status.status),
            })
        }
    }
}

#[async_trait]
impl ConfigStore for RaceServerClient {
    async fn put_race(&self, event: &EventDescriptor) -> Result<()> {
        let body = RaceConfigDto::from(event);
        self.http.post(&self.endpoint("config/race"), &body).await?;
        info!(round = event.id().get(), location = event.location(), "Race config saved");
        Ok(())
    }

    async fn put_session(&self, session: &SessionKey) -> Result<()> {
        let body = SessionDto::from(session);
        self.http.post(&self.endpoint("live/session"), &body).await?;
        info!(%session, "Live session selected");
        Ok(())
    }
}
