//! Fireboard collection core.
//!
//! This crate turns the Fireboard cloud API's device list into a flat set of
//! metric observations:
//!
//! - [`client`] - Authenticated fetch of `devices.json`
//! - [`device`] - Wire records and device snapshots
//! - [`decode`] - Payload to snapshot decoding
//! - [`mapping`] - Snapshot to observation mapping
//! - [`metrics`] - Metric definitions and observations
//! - [`scrape`] - The fetch, decode, map pipeline
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types
//!
//! Every scrape is independent: nothing is cached between calls.

pub mod client;
pub mod config;
pub mod decode;
pub mod device;
pub mod error;
pub mod mapping;
pub mod metrics;
pub mod scrape;

pub use client::FireboardClient;
pub use config::{
    ClientConfig, Credential, LogFormat, LoggingConfig, MapperConfig, load_config, parse_config,
};
pub use decode::decode;
pub use device::{ChannelReading, DeviceRecord, DeviceSnapshot, Diagnostics};
pub use error::{ConfigError, DecodeError, FetchError, FieldMappingError, ScrapeError};
pub use mapping::{MappedDevices, ObservationMapper};
pub use metrics::{Labels, Metric, MetricDescriptor, MetricDescriptors, Observation};
pub use scrape::{ScrapeOutput, Scraper};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    }
    .map_err(|e| ConfigError::Validation(format!("Failed to initialize tracing: {}", e)))
}
