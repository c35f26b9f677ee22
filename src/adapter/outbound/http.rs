//! Shared JSON-over-HTTP client with bounded retries.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::warn;

use crate::error::Result;

/// Client tuning shared by every HTTP adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry_max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5_000),
            connect_timeout: Duration::from_millis(3_000),
            retry_max_attempts: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// reqwest wrapper that retries connect failures and timeouts.
#[derive(Debug, Clone)]
pub struct JsonHttp {
    http: HttpClient,
    retry_max_attempts: u32,
    retry_backoff: Duration,
}

impl JsonHttp {
    #[must_use]
    pub fn new(settings: HttpSettings) -> Self {
        let http = HttpClient::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(concat!("racewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            retry_max_attempts: settings.retry_max_attempts,
            retry_backoff: settings.retry_backoff,
        }
    }

    /// GET `url` and decode the JSON body.
    pub async fn get<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = response.error_for_status()?;

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    /// POST `body` as JSON. Not retried; the caller decides what a failed
    /// write means.
    pub async fn post<B>(&self, url: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if !self.retry_backoff.is_zero() {
            sleep(self.retry_backoff).await;
        }
    }
}
