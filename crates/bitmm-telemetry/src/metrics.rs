//! Prometheus metrics for bitmm.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_gauge, CounterVec, Encoder, Gauge,
    IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Completed cycles.
/// Labels: outcome (quoted/unchanged/failed)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("bitmm_cycles_total", "Completed quoting cycles", &["outcome"]).unwrap()
});

/// Failed exchange calls.
/// Labels: operation (fetch_trades/fetch_order_book/fetch_position/submit_orders/cancel_all)
pub static EXCHANGE_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bitmm_exchange_errors_total",
        "Failed exchange calls",
        &["operation"]
    )
    .unwrap()
});

/// Cancel-all attempts.
/// Labels: result (confirmed/retried)
pub static CANCEL_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bitmm_cancel_attempts_total",
        "Cancel-all attempts",
        &["result"]
    )
    .unwrap()
});

/// Orders accepted by the exchange.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bitmm_orders_submitted_total",
        "Orders accepted by the exchange",
        &["side"]
    )
    .unwrap()
});

pub static THEO: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("bitmm_theo", "Current fair value estimate").unwrap());

pub static EDGE: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("bitmm_edge", "Current quoting edge").unwrap());

pub static POSITION: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("bitmm_position", "Current signed position").unwrap());

pub static LIVE_ORDERS: Lazy<IntGauge> =
    Lazy::new(|| register_int_gauge!("bitmm_live_orders", "Orders believed live").unwrap());

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a completed cycle.
    pub fn cycle(outcome: &str) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Cycles completed with `outcome` so far.
    pub fn cycle_count(outcome: &str) -> u64 {
        CYCLES_TOTAL.with_label_values(&[outcome]).get() as u64
    }

    /// Record a failed exchange call.
    pub fn exchange_error(operation: &str) {
        EXCHANGE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }

    /// Record a cancel-all that took `attempts` tries to confirm.
    pub fn cancel_attempts(attempts: u32) {
        if attempts == 0 {
            return;
        }
        CANCEL_ATTEMPTS_TOTAL
            .with_label_values(&["retried"])
            .inc_by(f64::from(attempts - 1));
        CANCEL_ATTEMPTS_TOTAL.with_label_values(&["confirmed"]).inc();
    }

    /// Record an accepted order.
    pub fn order_submitted(side: &str) {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record the latest quote inputs.
    pub fn quote_state(theo: f64, edge: f64, position: f64) {
        THEO.set(theo);
        EDGE.set(edge);
        POSITION.set(position);
    }

    pub fn live_orders(count: usize) {
        LIVE_ORDERS.set(count as i64);
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
