//! bitmm - single-instrument market maker for Bitfinex - Entry Point
//!
//! Press Enter (or Ctrl-C) to cancel all orders and exit.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Single-instrument market maker for Bitfinex
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BITMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured symbol
    #[arg(short, long)]
    symbol: Option<String>,

    /// Disable the console display
    #[arg(long)]
    no_display: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Determine config path: CLI arg > BITMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("BITMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let mut config = bitmm_bot::AppConfig::from_file(&config_path)?;
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }
    if args.no_display {
        config.display.enabled = false;
    }

    // Logging goes to the configured file so the display owns the console
    bitmm_telemetry::init_logging(&config.telemetry)?;

    info!("Starting bitmm v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        symbol = %config.symbol,
        max_size = %config.maker.max_size,
        "Configuration loaded"
    );

    let app = bitmm_bot::Application::new(config)?;
    app.shutdown_signal().spawn_watchers();

    app.run().await?;

    Ok(())
}
