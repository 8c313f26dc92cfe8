//! Single-instrument market maker for Bitfinex.
//!
//! Main application that orchestrates all components:
//! - Concurrent fetch of trades, position and order book
//! - Fair value, tiering and change detection (bitmm-mm)
//! - Order lifecycle with fail-safe cancel-all
//! - Console display and graceful shutdown on keypress or Ctrl-C

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod shutdown;

pub use app::{Application, CycleOutcome};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use shutdown::ShutdownSignal;
