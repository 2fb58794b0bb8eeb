//! Prometheus metrics exporter for Fireboard thermometers.
//!
//! Each request to the metrics endpoint triggers one scrape of the Fireboard
//! cloud API, and the result is rendered in Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Fireboard API  │<────│    Collector    │<────│   HTTP Server   │
//! │ (devices.json)  │     │ (fetch/decode/  │     │   (/metrics)    │
//! └─────────────────┘     │  map/render)    │     └─────────────────┘
//!                         └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! fireboard-exporter-prometheus --key <api-token>
//! fireboard-exporter-prometheus --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod exposition;
pub mod http;
pub mod naming;

pub use collector::{ScrapeCollector, SharedCollector};
pub use config::ExporterConfig;
pub use http::HttpServer;
