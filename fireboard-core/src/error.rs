use thiserror::Error;

/// Errors raised while talking to the Fireboard API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// The upstream payload did not have the expected shape.
#[derive(Debug, Error)]
#[error("Malformed device payload: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// A single field of one device could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldMappingError {
    #[error("Device '{device}': cannot parse CPU usage '{raw}'")]
    CpuUsage { device: String, raw: String },
}

impl FieldMappingError {
    /// Name of the device the error belongs to.
    pub fn device(&self) -> &str {
        match self {
            FieldMappingError::CpuUsage { device, .. } => device,
        }
    }
}

/// Reasons a whole scrape produced no observations.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Scrape cancelled by shutdown")]
    Cancelled,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for upstream fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
