//! Prometheus exporter for Fireboard thermometers.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use fireboard_core::{Credential, Scraper, init_tracing};
use fireboard_exporter_prometheus::{ExporterConfig, HttpServer, ScrapeCollector};

/// Prometheus exporter for Fireboard thermometers.
#[derive(Parser, Debug)]
#[command(name = "fireboard-exporter-prometheus")]
#[command(about = "Export Fireboard device readings as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long = "listen-address", alias = "listen")]
    listen: Option<String>,

    /// Fireboard API token (overrides config).
    #[arg(long, env = "FIREBOARD_TOKEN", hide_env_values = true)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
    }
    if let Some(key) = args.key {
        config.fireboard.token = Credential::new(key);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;
    config.require_token()?;

    init_tracing(&config.logging)?;

    info!(
        endpoint = %config.fireboard.endpoint,
        timeout_secs = config.fireboard.timeout_secs,
        "Starting Fireboard Prometheus Exporter"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scraper = Scraper::from_config(&config.fireboard, config.mapping)?;
    let collector = Arc::new(ScrapeCollector::new(
        scraper,
        &config.prometheus,
        &config.filters,
    ));

    let listen_addr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    let http_server = HttpServer::new(
        collector.clone(),
        listen_addr,
        config.prometheus.path.clone(),
    );

    let mut http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        error!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = &mut http_task => {
            anyhow::bail!("HTTP server exited unexpectedly");
        }
    }

    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    let stats = collector.stats();
    info!(
        scrapes = stats.scrapes,
        scrape_failures = stats.scrape_failures,
        field_errors = stats.field_errors,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}
