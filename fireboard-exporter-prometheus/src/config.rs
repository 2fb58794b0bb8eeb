//! Configuration for the Prometheus exporter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use fireboard_core::{ClientConfig, ConfigError, LoggingConfig, MapperConfig};

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Fireboard API settings.
    #[serde(default)]
    pub fireboard: ClientConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Observation mapping settings.
    #[serde(default)]
    pub mapping: MapperConfig,

    /// Device filtering settings.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// Labels added to every sample.
    #[serde(default)]
    pub default_labels: HashMap<String, String>,

    /// Metric name prefix (default: "fireboard").
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

fn default_prefix() -> String {
    "fireboard".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            default_labels: HashMap::new(),
            prefix: default_prefix(),
        }
    }
}

/// Device filtering by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Glob patterns for devices to include (empty = all).
    #[serde(default)]
    pub include_devices: Vec<String>,

    /// Glob patterns for devices to exclude.
    #[serde(default)]
    pub exclude_devices: Vec<String>,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// The token is not checked here since it may still come from the CLI.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fireboard.validate()?;

        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        for pattern in self
            .filters
            .include_devices
            .iter()
            .chain(&self.filters.exclude_devices)
        {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("Invalid device pattern '{}': {}", pattern, e))
            })?;
        }

        Ok(())
    }

    /// Fail unless an API token is configured.
    pub fn require_token(&self) -> Result<(), ConfigError> {
        if self.fireboard.token.is_empty() {
            return Err(ConfigError::Validation(
                "No Fireboard API token configured (use --key, FIREBOARD_TOKEN or fireboard.token)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
