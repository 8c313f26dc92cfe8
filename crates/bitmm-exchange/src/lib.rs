//! Exchange access for bitmm.
//!
//! The quoting engine only sees the [`Exchange`] capability trait:
//! fetch trades, order book and position, submit a batch of orders,
//! cancel everything. Two implementations are provided:
//!
//! - [`BitfinexClient`]: authenticated Bitfinex v1 REST client
//! - [`MockExchange`]: scripted test double that records every call

pub mod auth;
pub mod bitfinex;
pub mod error;
pub mod exchange;
pub mod mock;

pub use auth::{Credentials, NonceSource};
pub use bitfinex::{BitfinexClient, BitfinexConfig};
pub use error::{ExchangeError, ExchangeResult};
pub use exchange::{BoxFuture, DynExchange, Exchange, OrderAck};
pub use mock::{MockCall, MockExchange};
