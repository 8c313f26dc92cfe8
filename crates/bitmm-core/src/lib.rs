//! Core domain types for the bitmm market maker.
//!
//! This crate provides the value types shared by the quoting engine,
//! the exchange client and the application:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `Trade`, `OrderBook`: Market snapshots fetched each cycle
//! - `OrderSide`, `OrderIntent`, `OrderId`: What the engine wants quoted

pub mod decimal;
pub mod error;
pub mod market;
pub mod order;

pub use decimal::{round_up_to_tick, Price, Size};
pub use error::{CoreError, Result};
pub use market::{BookLevel, OrderBook, Trade};
pub use order::{OrderId, OrderIntent, OrderSide};
