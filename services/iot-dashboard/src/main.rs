//! IoT Dashboard CLI
//!
//! Command-line interface for the read-only device telemetry dashboard.

use std::path::PathBuf;

use clap::Parser;
use iot_dashboard::{load_config, Config, DashboardBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "iot-dashboard")]
#[command(about = "Read-only IoT device telemetry dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file and IOT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Time range of readings to request, in seconds (overrides config file)
    #[arg(long)]
    time_range: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, api_url={:?}, port={:?}, time_range={:?}, log_level={:?}",
        args.config,
        args.api_url,
        args.port,
        args.time_range,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env();
    config.apply_api_url(args.api_url);

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(time_range) = args.time_range {
        config.api.time_range_seconds = time_range;
    }

    tracing::info!("Starting IoT dashboard");
    tracing::debug!(
        "Backend: {}, interval: {:?}, time range: {}s",
        config.api.base_url,
        config.polling.interval,
        config.api.time_range_seconds
    );

    let dashboard = DashboardBuilder::new(config).build().await?;

    let cancel = dashboard.cancellation_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel.cancel();
    });

    dashboard.start().await?;

    Ok(())
}
