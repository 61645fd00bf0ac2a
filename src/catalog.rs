use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::Settings;

const RETRY_STATUSES: &[u16] = &[500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// The catalog's HTTP surface: existence probes and document fetches.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// True when `url` answers 200. Transport errors count as "no".
    async fn exists(&self, url: &str) -> bool;

    /// Fetch a document body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpCatalog {
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl HttpCatalog {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
        })
    }

    async fn get_once(&self, url: &str) -> Result<(StatusCode, String), FetchError> {
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        let body = response.text().await.map_err(request_err)?;
        Ok((status, body))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => {
                debug!("HEAD {} -> {}", url, resp.status());
                resp.status() == StatusCode::OK
            }
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            let (status, body) = self.get_once(url).await?;
            if status.is_success() {
                return Ok(body);
            }

            attempt += 1;
            if !is_retryable(status.as_u16()) || attempt >= self.max_retries {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let backoff = backoff_delay(self.backoff_base, attempt - 1);
            warn!(
                "HTTP {} on {} (attempt {}/{}), backing off {:.1}s",
                status,
                url,
                attempt,
                self.max_retries,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

/// Server-side errors are worth another try; everything else is final.
pub fn is_retryable(status: u16) -> bool {
    RETRY_STATUSES.contains(&status)
}

/// `base * 2^attempt`, attempt counted from zero.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
