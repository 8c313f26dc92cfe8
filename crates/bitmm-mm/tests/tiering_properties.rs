//! Property tests for the quoting pipeline.
//!
//! Uses proptest to verify:
//! 1. Constant prices give zero volatility and theo equal to that price
//! 2. Flat positions quote both sides at full size
//! 3. Partial long positions quote three orders with skewed sizes
//! 4. Positions at or beyond the long cap only flatten
//! 5. Mirroring the position mirrors the quotes across theo
//! 6. Nothing live always requires an update

use bitmm_core::{OrderIntent, OrderSide, Trade};
use bitmm_mm::{calculate_intents, estimate, update_required, LiveOrderSet, MakerConfig, TheoWeighting};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn config() -> MakerConfig {
    MakerConfig {
        max_size: dec!(1.0),
        min_size: dec!(0.05),
        exit_edge_factor: dec!(0.5),
        price_tick: dec!(0.01),
        ..Default::default()
    }
}

// ── Strategies ───────────────────────────────────────────────────────

/// Position in hundredths, well past the caps on both sides.
fn arb_position() -> impl Strategy<Value = Decimal> {
    (-300i64..=300).prop_map(|p| Decimal::new(p, 2))
}

/// Theo off the tick grid, as a weighted average usually is.
fn arb_theo() -> impl Strategy<Value = Decimal> {
    (50_000_000i64..5_000_000_000).prop_map(|t| Decimal::new(t, 6))
}

fn arb_edge_fractional() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000).prop_map(|e| Decimal::new(e, 6))
}

fn arb_edge() -> impl Strategy<Value = Decimal> {
    (1i64..500).prop_map(|e| Decimal::new(e, 2))
}

fn arb_sizes() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1i64..100_000, any::<bool>()), 2..40).prop_map(|v| {
        v.into_iter()
            .map(|(s, neg)| {
                let size = Decimal::new(s, 3);
                if neg {
                    -size
                } else {
                    size
                }
            })
            .collect()
    })
}

fn sorted(intents: &[OrderIntent]) -> Vec<(bool, Decimal, Decimal)> {
    let mut v: Vec<_> = intents
        .iter()
        .map(|i| (i.side == OrderSide::Buy, i.size.inner(), i.price.inner()))
        .collect();
    v.sort();
    v
}

// ── 1. Fair value on constant prices ─────────────────────────────────

proptest! {
    #[test]
    fn constant_prices_have_zero_volatility(
        cents in 1i64..10_000_000,
        sizes in arb_sizes(),
    ) {
        let price = Decimal::new(cents, 2);
        let trades: Vec<Trade> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let seq = (sizes.len() - i) as u64;
                Trade::new(seq, 1_000 + seq as i64 * 7, price, *size)
            })
            .collect();

        let volume = MakerConfig { theo_weighting: TheoWeighting::Volume, ..config() };
        let fv = estimate(&trades, &volume).unwrap();
        prop_assert_eq!(fv.theo, price);
        prop_assert_eq!(fv.volatility, Decimal::ZERO);

        let fv = estimate(&trades, &config()).unwrap();
        prop_assert!((fv.theo - price).abs() < dec!(0.000000001));
        prop_assert_eq!(fv.volatility, Decimal::ZERO);
    }
}

// ── 2-4. Band shapes ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn flat_quotes_both_sides_at_max(
        p in -4i64..=4,
        theo in arb_theo(),
        edge in arb_edge(),
    ) {
        let config = config();
        let intents = calculate_intents(Decimal::new(p, 2), theo, edge, &config);
        prop_assert_eq!(intents.len(), 2);
        prop_assert_eq!(intents[0].side, OrderSide::Buy);
        prop_assert_eq!(intents[1].side, OrderSide::Sell);
        prop_assert!(intents.iter().all(|i| i.size.inner() == config.max_size));
    }

    #[test]
    fn partial_long_skews_sizes(
        p in 6i64..95,
        theo in arb_theo(),
        edge in arb_edge(),
    ) {
        let config = config();
        let position = Decimal::new(p, 2);
        let intents = calculate_intents(position, theo, edge, &config);
        prop_assert_eq!(intents.len(), 3);
        prop_assert!(intents.iter().all(|i| i.size.is_positive()));

        let buy = &intents[0];
        prop_assert_eq!(buy.side, OrderSide::Buy);
        prop_assert_eq!(buy.size.inner(), config.max_size - position);
        prop_assert_eq!(intents[1].size.inner(), position);
        prop_assert_eq!(intents[2].size.inner(), config.max_size);
        prop_assert!(intents[1..].iter().all(|i| i.side == OrderSide::Sell));
    }

    #[test]
    fn max_long_only_flattens(
        p in 95i64..300,
        theo in arb_theo(),
        edge in arb_edge(),
    ) {
        let position = Decimal::new(p, 2);
        let intents = calculate_intents(position, theo, edge, &config());
        prop_assert_eq!(intents.len(), 1);
        prop_assert_eq!(intents[0].side, OrderSide::Sell);
        prop_assert_eq!(intents[0].size.inner(), position);
        prop_assert!(intents[0].price.inner() >= theo);
    }
}

// ── 5. Symmetry ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn mirrored_position_mirrors_quotes(
        position in arb_position(),
        theo in arb_theo(),
        edge in prop_oneof![arb_edge(), arb_edge_fractional()],
    ) {
        let config = config();
        let long: Vec<OrderIntent> = calculate_intents(position, theo, edge, &config)
            .iter()
            .map(|i| i.mirrored(theo))
            .collect();
        let short = calculate_intents(-position, theo, edge, &config);
        prop_assert_eq!(sorted(&long), sorted(&short));
    }

    #[test]
    fn every_intent_is_positive(
        position in arb_position(),
        theo in arb_theo(),
        edge in arb_edge(),
    ) {
        let intents = calculate_intents(position, theo, edge, &config());
        prop_assert!(intents.len() <= 3);
        prop_assert!(intents.iter().all(|i| i.size.is_positive() && i.price.is_positive()));
    }
}

// ── 6. Change detection ──────────────────────────────────────────────

proptest! {
    #[test]
    fn nothing_live_always_requires_update(
        theo in arb_theo(),
        last_theo in arb_theo(),
        position in arb_position(),
        last_position in arb_position(),
    ) {
        let live = LiveOrderSet {
            orders: Vec::new(),
            last_theo,
            last_position,
            has_orders: false,
        };
        prop_assert!(update_required(theo, position, &live, &config()));
        prop_assert!(update_required(last_theo, last_position, &live, &config()));
    }
}
