//! Scrape collector: runs the pipeline for each `/metrics` request and
//! renders the result.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use fireboard_core::metrics::{CHANNEL_LABEL, DEVICE_LABEL};
use fireboard_core::{MetricDescriptors, Observation, ScrapeError, Scraper};

use crate::config::{FilterConfig, PrometheusConfig};
use crate::exposition::{write_observations, write_sample};
use crate::naming::{sanitize_label_name, sanitize_prefix};

/// Filter for devices by name.
pub struct DeviceFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl DeviceFilter {
    /// Create a new filter from configuration. Invalid patterns are ignored.
    pub fn new(config: &FilterConfig) -> Self {
        let compile = |patterns: &[String]| -> Vec<glob::Pattern> {
            patterns
                .iter()
                .filter_map(|p| glob::Pattern::new(p).ok())
                .collect()
        };

        Self {
            include: compile(&config.include_devices),
            exclude: compile(&config.exclude_devices),
        }
    }

    /// Check if a device should be exported.
    pub fn should_include(&self, device: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(device)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(device))
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

/// Collector statistics.
#[derive(Debug, Clone, Default)]
pub struct CollectorStats {
    /// Scrapes attempted.
    pub scrapes: u64,
    /// Scrapes that failed to fetch or decode.
    pub scrape_failures: u64,
    /// Field mapping errors across all scrapes.
    pub field_errors: u64,
    /// Observations dropped by the device filter.
    pub observations_filtered: u64,
    /// Whether the most recent finished scrape succeeded.
    pub last_scrape_success: bool,
    pub last_scrape_duration: Duration,
    /// Devices exported by the last successful scrape.
    pub last_scrape_devices: usize,
}

/// Runs scrapes on demand. Holds no metric data between requests.
pub struct ScrapeCollector {
    scraper: Scraper,
    descriptors: MetricDescriptors,
    filter: DeviceFilter,
    default_labels: Vec<(String, String)>,
    prefix: String,
    stats: RwLock<CollectorStats>,
}

/// Create a shareable collector handle.
pub type SharedCollector = Arc<ScrapeCollector>;

impl ScrapeCollector {
    /// Create a new collector.
    pub fn new(scraper: Scraper, prometheus: &PrometheusConfig, filters: &FilterConfig) -> Self {
        let prefix = sanitize_prefix(&prometheus.prefix);

        let mut default_labels: Vec<(String, String)> = prometheus
            .default_labels
            .iter()
            .map(|(k, v)| (sanitize_label_name(k), v.clone()))
            .filter(|(k, _)| k != DEVICE_LABEL && k != CHANNEL_LABEL)
            .collect();
        default_labels.sort();
        default_labels.dedup_by(|a, b| a.0 == b.0);

        Self {
            scraper,
            descriptors: MetricDescriptors::new(&prefix),
            filter: DeviceFilter::new(filters),
            default_labels,
            prefix,
            stats: RwLock::new(CollectorStats::default()),
        }
    }

    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    /// Get collector statistics.
    pub fn stats(&self) -> CollectorStats {
        self.stats.read().clone()
    }

    /// Scrape upstream and render the exposition body.
    ///
    /// Fetch and decode failures are returned as errors; no partial output
    /// is ever rendered.
    pub async fn collect(&self, shutdown: watch::Receiver<bool>) -> Result<String, ScrapeError> {
        self.stats.write().scrapes += 1;

        let output = match self.scraper.scrape_until(shutdown).await {
            Ok(output) => output,
            Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
            Err(e) => {
                warn!(error = %e, "Scrape failed");
                let mut stats = self.stats.write();
                stats.scrape_failures += 1;
                stats.last_scrape_success = false;
                return Err(e);
            }
        };

        let devices = output
            .devices
            .iter()
            .filter(|name| self.filter.should_include(name))
            .count();
        let mut field_errors = 0;
        for error in output
            .mapped
            .errors
            .iter()
            .filter(|e| self.filter.should_include(e.device()))
        {
            warn!(device = %error.device(), error = %error, "Field mapping error");
            field_errors += 1;
        }

        let total = output.mapped.observations.len();
        let observations: Vec<Observation> = output
            .mapped
            .observations
            .into_iter()
            .filter(|o| self.filter.should_include(&o.labels.device))
            .collect();
        let filtered = total - observations.len();
        if filtered > 0 {
            trace!(filtered, "Observations removed by device filter");
        }

        {
            let mut stats = self.stats.write();
            stats.field_errors += field_errors;
            stats.observations_filtered += filtered as u64;
            stats.last_scrape_success = true;
            stats.last_scrape_duration = output.duration;
            stats.last_scrape_devices = devices;
        }

        debug!(devices, samples = observations.len(), "Rendering scrape");
        Ok(self.render(&observations))
    }

    /// Render observations followed by the exporter's own statistics.
    pub fn render(&self, observations: &[Observation]) -> String {
        let mut output = Vec::with_capacity(observations.len() * 80 + 1024);
        write_observations(
            &mut output,
            &self.descriptors,
            observations,
            &self.default_labels,
        );

        let stats = self.stats.read().clone();
        let name = |suffix: &str| {
            if self.prefix.is_empty() {
                format!("exporter_{}", suffix)
            } else {
                format!("{}_exporter_{}", self.prefix, suffix)
            }
        };

        write_sample(
            &mut output,
            &name("scrapes_total"),
            "counter",
            "Scrapes of the Fireboard API attempted",
            stats.scrapes as f64,
        );
        write_sample(
            &mut output,
            &name("scrape_failures_total"),
            "counter",
            "Scrapes that failed to fetch or decode the device list",
            stats.scrape_failures as f64,
        );
        write_sample(
            &mut output,
            &name("field_errors_total"),
            "counter",
            "Device fields that could not be converted to a number",
            stats.field_errors as f64,
        );
        write_sample(
            &mut output,
            &name("observations_filtered_total"),
            "counter",
            "Samples dropped by the device filters",
            stats.observations_filtered as f64,
        );
        write_sample(
            &mut output,
            &name("last_scrape_duration_seconds"),
            "gauge",
            "Duration of the last successful scrape",
            stats.last_scrape_duration.as_secs_f64(),
        );
        write_sample(
            &mut output,
            &name("last_scrape_devices"),
            "gauge",
            "Devices exported by the last successful scrape",
            stats.last_scrape_devices as f64,
        );

        String::from_utf8(output).unwrap_or_default()
    }
}
