//! Exchange error types.

use thiserror::Error;

/// Failure of a single exchange call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Network or HTTP-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Well-formed response in which the exchange refused the request.
    #[error("Exchange rejected request: {0}")]
    Rejected(String),

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ExchangeError {
    /// Decoding failures are handled exactly like transport failures.
    #[must_use]
    pub fn is_transport_like(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
