//! Quoting engine error types.

use bitmm_core::CoreError;
use bitmm_exchange::ExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MakerError {
    /// Not enough trades to estimate a fair value.
    #[error("Insufficient data: needed {needed} trades, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Every trade in the window has zero size, so no weight to average.
    #[error("No traded volume across {trades} trades")]
    NoVolume { trades: usize },

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Cancel-all reported failure or partial success.
    #[error("Inconsistent cancel: {0}")]
    InconsistentCancel(String),

    /// The exchange accepted fewer orders than were submitted.
    #[error("Submission rejected: {accepted} of {requested} orders accepted")]
    SubmissionRejected { requested: usize, accepted: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
}

pub type MakerResult<T> = Result<T, MakerError>;
