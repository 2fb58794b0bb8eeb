//! One scrape: fetch, decode, map.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

use crate::client::FireboardClient;
use crate::config::{ClientConfig, MapperConfig};
use crate::decode::decode;
use crate::error::{FetchResult, ScrapeError};
use crate::mapping::{MappedDevices, ObservationMapper};

/// Outcome of a successful scrape.
///
/// Field mapping errors are returned in `mapped.errors` and left to the
/// caller to report.
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub mapped: MappedDevices,
    /// Device names in payload order.
    pub devices: Vec<String>,
    pub duration: Duration,
}

/// Stateless scrape pipeline. Safe to share between concurrent requests.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: FireboardClient,
    mapper: ObservationMapper,
}

impl Scraper {
    pub fn new(client: FireboardClient, mapper: ObservationMapper) -> Self {
        Self { client, mapper }
    }

    pub fn from_config(client: &ClientConfig, mapper: MapperConfig) -> FetchResult<Self> {
        Ok(Self::new(
            FireboardClient::new(client)?,
            ObservationMapper::new(mapper),
        ))
    }

    /// Run one full scrape.
    ///
    /// Dropping the returned future aborts the upstream request.
    pub async fn scrape(&self) -> Result<ScrapeOutput, ScrapeError> {
        let started = Instant::now();
        debug!(endpoint = %self.client.endpoint(), "Starting scrape");

        let payload = self.client.fetch().await?;
        let devices = decode(&payload)?;
        let mapped = self.mapper.map(&devices);

        let duration = started.elapsed();
        debug!(
            devices = devices.len(),
            observations = mapped.observations.len(),
            field_errors = mapped.errors.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Scrape finished"
        );

        Ok(ScrapeOutput {
            mapped,
            devices: devices.into_iter().map(|d| d.name).collect(),
            duration,
        })
    }

    /// Like [`scrape`](Self::scrape), but gives up as soon as `shutdown`
    /// turns `true`.
    pub async fn scrape_until(
        &self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<ScrapeOutput, ScrapeError> {
        if *shutdown.borrow() {
            return Err(ScrapeError::Cancelled);
        }

        tokio::select! {
            result = self.scrape() => result,
            _ = async {
                // A dropped sender never signals shutdown.
                if shutdown.wait_for(|stop| *stop).await.is_err() {
                    std::future::pending::<()>().await;
                }
            } => {
                debug!("Scrape cancelled by shutdown");
                Err(ScrapeError::Cancelled)
            }
        }
    }
}
