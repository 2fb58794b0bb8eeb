//! Fireboard API client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{FetchError, FetchResult};

/// Issues the single upstream request of a scrape.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FireboardClient {
    http: reqwest::Client,
    endpoint: String,
    authorization: HeaderValue,
}

impl FireboardClient {
    /// Build a client with the configured timeout and credential.
    pub fn new(config: &ClientConfig) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("fireboard-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let mut authorization =
            HeaderValue::from_str(&format!("{} {}", config.auth_scheme, config.token.expose()))
                .map_err(|_| {
                    FetchError::Request("credential contains invalid header characters".to_string())
                })?;
        authorization.set_sensitive(true);

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            authorization,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the raw device list body. One attempt, no retries.
    pub async fn fetch(&self) -> FetchResult<Vec<u8>> {
        let url = self.endpoint.as_str();

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!(url, bytes = body.len(), "Fetched device list");
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_builder() {
        FetchError::Request(e.to_string())
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
