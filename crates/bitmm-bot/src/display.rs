//! Console display of the current quoting state.

use std::fmt::Write as _;

use bitmm_core::{OrderBook, Trade};
use bitmm_mm::LiveOrderSet;
use rust_decimal::Decimal;
use tracing::debug;

/// ANSI clear screen + cursor home.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Everything shown for one cycle.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub symbol: &'a str,
    pub book: Option<&'a OrderBook>,
    pub trades: &'a [Trade],
    pub position: Decimal,
    pub theo: Decimal,
    pub edge: Decimal,
    pub live: &'a LiveOrderSet,
    pub fetch_ms: u128,
}

/// Render a frame as text.
///
/// The book is printed asks first (highest at top) above the bids, so the
/// spread sits in the middle.
pub fn render(frame: &Frame<'_>, trades_shown: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", frame.symbol.to_uppercase());

    if let Some(book) = frame.book {
        let _ = writeln!(out, "\n{:>12} {:>12} {:>12}", "Bid", "Ask", "Size");
        let _ = writeln!(out, "{}", "-".repeat(38));
        for level in book.asks.iter().rev() {
            let _ = writeln!(out, "{:>12} {:>12} {:>12}", "", level.price, level.size);
        }
        for level in &book.bids {
            let _ = writeln!(out, "{:>12} {:>12} {:>12}", level.price, "", level.size);
        }
        if let Some(mid) = book.mid_price() {
            let _ = writeln!(out, "Mid: {mid}");
        }
    }

    if !frame.trades.is_empty() {
        let _ = writeln!(out, "\nRecent trades");
        for trade in frame.trades.iter().take(trades_shown) {
            let time = trade
                .time()
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| trade.timestamp.to_string());
            let _ = writeln!(out, "  {time}  {:>12} {:>12}", trade.price, trade.size);
        }
    }

    let _ = writeln!(out, "\nPosition: {}", frame.position);
    let _ = writeln!(out, "Theo:     {}", frame.theo.round_dp(4));
    let _ = writeln!(out, "Edge:     {}", frame.edge.round_dp(4));

    let _ = writeln!(out, "\nLive orders");
    if frame.live.has_orders {
        for order in &frame.live.orders {
            let notional = order.intent.size.notional(order.intent.price);
            let _ = writeln!(
                out,
                "  #{:<12} {}  ({})",
                order.order_id,
                order.intent,
                notional.round_dp(2)
            );
        }
    } else {
        let _ = writeln!(out, "  none");
    }

    let _ = writeln!(out, "\n{} ms to retrieve data", frame.fetch_ms);
    out
}

/// Clear the terminal and print `frame`.
pub fn print(frame: &Frame<'_>, trades_shown: usize) {
    let text = render(frame, trades_shown);
    if let Err(e) = write_frame(&mut std::io::stdout().lock(), &text) {
        debug!(error = %e, "Failed to print display frame");
    }
}

fn write_frame(out: &mut impl std::io::Write, text: &str) -> std::io::Result<()> {
    write!(out, "{CLEAR_SCREEN}{text}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitmm_core::{BookLevel, OrderId, OrderIntent, OrderSide};
    use bitmm_mm::LiveOrder;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_asks_descend_above_bids() {
        let book = OrderBook {
            bids: vec![BookLevel::new(dec!(99.5), dec!(1)), BookLevel::new(dec!(99.0), dec!(2))],
            asks: vec![BookLevel::new(dec!(100.5), dec!(1)), BookLevel::new(dec!(101.0), dec!(3))],
        };
        let live = LiveOrderSet::default();
        let frame = Frame {
            symbol: "btcusd",
            book: Some(&book),
            trades: &[],
            position: Decimal::ZERO,
            theo: dec!(100),
            edge: dec!(0.1),
            live: &live,
            fetch_ms: 12,
        };
        let text = render(&frame, 10);

        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("101.0") < pos("100.5"));
        assert!(pos("100.5") < pos("99.5"));
        assert!(pos("99.5") < pos("99.0"));
        assert!(text.contains("none"));
        assert!(text.contains("12 ms"));
    }

    #[test]
    fn test_live_orders_and_trade_limit() {
        let trades: Vec<Trade> = (0..5)
            .map(|i| Trade::new(10 - i, 1_400_000_000 - i as i64, dec!(100) + Decimal::from(i), dec!(1)))
            .collect();
        let live = LiveOrderSet {
            orders: vec![LiveOrder {
                order_id: OrderId(42),
                intent: OrderIntent::new(OrderSide::Buy, dec!(0.4), dec!(99.90)).unwrap(),
            }],
            last_theo: dec!(100),
            last_position: dec!(0.6),
            has_orders: true,
        };
        let frame = Frame {
            symbol: "btcusd",
            book: None,
            trades: &trades,
            position: dec!(0.6),
            theo: dec!(100),
            edge: dec!(0.1),
            live: &live,
            fetch_ms: 0,
        };
        let text = render(&frame, 2);

        assert!(text.contains("BTCUSD"));
        assert!(text.contains("101"));
        assert!(!text.contains("102"));
        assert!(text.contains("#42"));
        assert!(text.contains("buy 0.4 @ 99.90"));
        assert!(text.contains("(39.96)"));
        assert!(text.contains("Position: 0.6"));
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_frame_reports_io_errors() {
        let mut buf = Vec::new();
        write_frame(&mut buf, "frame").unwrap();
        assert!(buf.ends_with(b"frame"));
        assert!(buf.starts_with(CLEAR_SCREEN.as_bytes()));

        let err = write_frame(&mut BrokenPipe, "frame").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
