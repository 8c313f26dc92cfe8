//! Application configuration.

use std::time::Duration;

use bitmm_exchange::BitfinexConfig;
use bitmm_mm::{MakerConfig, MakerError};
use bitmm_telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Exchange connection settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSettings {
    /// Order type ("limit" for margin, "exchange limit" for spot).
    #[serde(default = "default_order_type")]
    pub order_type: String,

    /// Routing venue sent with each order.
    #[serde(default = "default_venue")]
    pub venue: String,

    /// Book levels fetched per side for display.
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            order_type: default_order_type(),
            venue: default_venue(),
            book_depth: default_book_depth(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_order_type() -> String {
    "limit".to_string()
}
fn default_venue() -> String {
    "bitfinex".to_string()
}
fn default_book_depth() -> usize {
    10
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Console display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of recent trades printed.
    #[serde(default = "default_trades_shown")]
    pub trades_shown: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trades_shown: default_trades_shown(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_trades_shown() -> usize {
    10
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Instrument quoted, e.g. "btcusd".
    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Pause between cycles.
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    #[serde(default)]
    pub maker: MakerConfig,

    #[serde(default)]
    pub exchange: ExchangeSettings,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub telemetry: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            api_url: default_api_url(),
            cycle_interval_ms: default_cycle_interval_ms(),
            maker: MakerConfig::default(),
            exchange: ExchangeSettings::default(),
            display: DisplayConfig::default(),
            telemetry: LoggingConfig::default(),
        }
    }
}

fn default_symbol() -> String {
    "btcusd".to_string()
}
fn default_api_url() -> String {
    "https://api.bitfinex.com".to_string()
}
fn default_cycle_interval_ms() -> u64 {
    2000
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Startup validation. Failures here are the only fatal errors.
    pub fn validate(&self) -> AppResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(AppError::Config("symbol must not be empty".to_string()));
        }
        if self.exchange.request_timeout_ms == 0 {
            return Err(AppError::Config(
                "exchange.request_timeout_ms must be positive".to_string(),
            ));
        }
        self.maker.validate().map_err(MakerError::from)?;
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    /// Client settings for the Bitfinex REST API.
    pub fn bitfinex_config(&self) -> BitfinexConfig {
        BitfinexConfig {
            base_url: self.api_url.trim_end_matches('/').to_string(),
            order_type: self.exchange.order_type.clone(),
            venue: self.exchange.venue.clone(),
            request_timeout: Duration::from_millis(self.exchange.request_timeout_ms),
        }
    }
}
