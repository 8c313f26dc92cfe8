//! Quoting engine for bitmm.
//!
//! Turns a snapshot of recent trades and the current position into the set
//! of orders that should be resting at the exchange, and keeps the exchange
//! in line with that decision:
//! - Fair value (theo) and volatility from the trade window
//! - Position tiering: which orders, how large, at what price
//! - Change detection to avoid cancel/replace churn
//! - Order lifecycle: cancel-then-place with fail-safe recovery
//!
//! # Architecture
//!
//! ```text
//! Snapshot (trades, position)
//!   ├─ fair_value::estimate  → theo, volatility
//!   ├─ tiering::decide       → QuoteDecision (theo, edge, intents)
//!   ├─ requote::update_required(decision, live set)
//!   └─ OrderManager::place   → cancel_all (retry until confirmed) → submit
//! ```

pub mod config;
pub mod error;
pub mod fair_value;
pub mod order_manager;
pub mod requote;
pub mod tiering;

pub use config::{MakerConfig, TheoWeighting};
pub use error::{MakerError, MakerResult};
pub use fair_value::{estimate, FairValue};
pub use order_manager::{LiveOrder, LiveOrderSet, OrderManager, OrderSetState};
pub use requote::update_required;
pub use tiering::{calculate_intents, decide, QuoteDecision};
