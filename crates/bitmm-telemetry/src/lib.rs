//! Prometheus metrics and structured logging for bitmm.
//!
//! - Structured logging with tracing, optionally to a log file so the
//!   console stays free for the quote display
//! - Prometheus metrics for cycles, exchange errors and order actions

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LoggingConfig};
pub use metrics::Metrics;
