//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Maker error: {0}")]
    Maker(#[from] bitmm_mm::MakerError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] bitmm_exchange::ExchangeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] bitmm_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
