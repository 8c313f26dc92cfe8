//! Cycle orchestrator.
//!
//! One strict loop, no overlapping cycles:
//!
//! ```text
//! shutdown? ─yes─▶ cancel_all, exit
//!    │no
//! fetch trades ┐
//! fetch position├─ join
//! fetch book   ┘
//!    │ any failure ─▶ cancel_all, Failed
//! estimate ─fewer than 2 trades─▶ cancel_all, Failed
//!    │
//! decide → needs_update? ─yes─▶ place
//!    │
//! render, sleep (woken early by shutdown)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bitmm_core::{OrderBook, Trade};
use bitmm_exchange::{BitfinexClient, Credentials, DynExchange, ExchangeResult};
use bitmm_mm::{decide, estimate, MakerError, OrderManager, QuoteDecision};
use bitmm_telemetry::Metrics;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::display::{self, Frame};
use crate::error::AppResult;
use crate::shutdown::ShutdownSignal;

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New orders were placed (or the set was emptied).
    Quoted,
    /// Live orders still reflect theo and position.
    Unchanged,
    /// A fetch, the estimator or order placement failed.
    Failed(String),
}

impl CycleOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quoted => "quoted",
            Self::Unchanged => "unchanged",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "{}: {reason}", self.label()),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// Market and account data fetched at the start of a cycle.
struct Snapshot {
    trades: Vec<Trade>,
    position: Decimal,
    book: Option<OrderBook>,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    exchange: DynExchange,
    orders: OrderManager,
    shutdown: ShutdownSignal,
}

impl Application {
    /// Create an application trading against Bitfinex.
    ///
    /// Credentials are read from `BITFINEX_KEY` / `BITFINEX_SECRET`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let client = BitfinexClient::new(config.bitfinex_config(), Credentials::from_env())?;
        Ok(Self::with_exchange(config, Arc::new(client), ShutdownSignal::new()))
    }

    /// Create an application against any exchange implementation.
    pub fn with_exchange(config: AppConfig, exchange: DynExchange, shutdown: ShutdownSignal) -> Self {
        let orders = OrderManager::new(exchange.clone(), config.symbol.clone(), config.maker.clone());
        Self {
            config,
            exchange,
            orders,
            shutdown,
        }
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    /// Run cycles until shutdown, then cancel everything.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            symbol = %self.config.symbol,
            interval_ms = self.config.cycle_interval_ms,
            "Entering quoting loop"
        );

        let interval = self.config.cycle_interval();
        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            let outcome = self.run_cycle().await;
            debug!(outcome = %outcome, "Cycle complete");

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.shutdown.wait() => {}
            }
        }

        info!("Shutdown requested, cancelling all orders");
        let attempts = self.orders.shutdown().await;
        Metrics::cancel_attempts(attempts);
        Metrics::live_orders(0);

        info!(
            quoted = Metrics::cycle_count("quoted"),
            unchanged = Metrics::cycle_count("unchanged"),
            failed = Metrics::cycle_count("failed"),
            "Shutdown complete"
        );
        match Metrics::render_text() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to render metrics"),
        }
        Ok(())
    }

    /// Execute one cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.cycle().await;
        Metrics::cycle(outcome.label());
        Metrics::live_orders(self.orders.live().orders.len());
        outcome
    }

    async fn cycle(&mut self) -> CycleOutcome {
        let started = Instant::now();
        let snapshot = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(reason) => return self.fail_safe(reason).await,
        };
        let fetch_ms = started.elapsed().as_millis();

        let maker = &self.config.maker;
        let fair_value = match estimate(&snapshot.trades, maker) {
            Ok(fv) => fv,
            Err(e) => return self.fail_safe(e.to_string()).await,
        };

        let decision = decide(&fair_value, snapshot.position, maker);

        Metrics::quote_state(
            decision.theo.to_f64().unwrap_or_default(),
            decision.edge.to_f64().unwrap_or_default(),
            snapshot.position.to_f64().unwrap_or_default(),
        );

        let outcome = if self.orders.needs_update(&decision, snapshot.position) {
            info!(
                theo = %decision.theo,
                edge = %decision.edge,
                position = %snapshot.position,
                orders = decision.intents.len(),
                "Requoting"
            );
            match self.orders.place(&decision, snapshot.position).await {
                Ok(_) => {
                    for order in &self.orders.live().orders {
                        Metrics::order_submitted(&order.intent.side.to_string());
                    }
                    CycleOutcome::Quoted
                }
                Err(e) => {
                    if matches!(e, MakerError::Exchange(_)) {
                        Metrics::exchange_error("submit_orders");
                    }
                    warn!(error = %e, "Placement failed, skipping cycle");
                    return CycleOutcome::Failed(e.to_string());
                }
            }
        } else {
            CycleOutcome::Unchanged
        };

        self.render(&snapshot, &decision, fetch_ms);
        outcome
    }

    /// Fetch trades, position and (when displayed) the book concurrently.
    async fn fetch_snapshot(&self) -> Result<Snapshot, String> {
        let symbol = self.config.symbol.as_str();
        let depth = self.config.exchange.book_depth;
        let book_fut = async {
            if self.config.display.enabled {
                self.exchange.fetch_order_book(symbol, depth, depth).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let (trades, position, book) = tokio::join!(
            self.exchange.fetch_trades(symbol, self.config.maker.trade_window),
            self.exchange.fetch_position(symbol),
            book_fut,
        );

        Ok(Snapshot {
            trades: check("fetch_trades", trades)?,
            position: check("fetch_position", position)?,
            book: check("fetch_order_book", book)?,
        })
    }

    /// Abandon the cycle, cancelling everything first.
    async fn fail_safe(&mut self, reason: String) -> CycleOutcome {
        warn!(reason = %reason, "Cycle failed, cancelling all orders");
        let attempts = self.orders.cancel_all().await;
        Metrics::cancel_attempts(attempts);
        CycleOutcome::Failed(reason)
    }

    fn render(&self, snapshot: &Snapshot, decision: &QuoteDecision, fetch_ms: u128) {
        if !self.config.display.enabled {
            return;
        }
        let frame = Frame {
            symbol: &self.config.symbol,
            book: snapshot.book.as_ref(),
            trades: &snapshot.trades,
            position: snapshot.position,
            theo: decision.theo,
            edge: decision.edge,
            live: self.orders.live(),
            fetch_ms,
        };
        display::print(&frame, self.config.display.trades_shown);
    }
}

/// Record and describe a failed fetch.
fn check<T>(operation: &str, result: ExchangeResult<T>) -> Result<T, String> {
    result.map_err(|e| {
        Metrics::exchange_error(operation);
        warn!(operation, error = %e, "Exchange call failed");
        format!("{operation}: {e}")
    })
}
