//! Position tiering policy.
//!
//! Pure decision table from (position, theo, edge) to the orders that
//! should be resting. Bands, in evaluation order:
//!
//! | Band          | Condition                               | Orders |
//! |---------------|-----------------------------------------|--------|
//! | Flat          | `|pos| < min`                           | buy max @ -e, sell max @ +e |
//! | Max short     | `pos <= -max + min`                     | buy -pos @ -e·x |
//! | Max long      | `pos >= max - min`                      | sell pos @ +e·x |
//! | Partial short | `-max + min < pos <= -min`              | buy max @ -e, buy -pos @ -e·x, sell max+pos @ +e |
//! | Partial long  | `min <= pos < max - min`                | buy max-pos @ -e, sell pos @ +e·x, sell max @ +e |
//!
//! `e` is edge, `x` is `exit_edge_factor`. The max bands are closed, so a
//! position exactly on a boundary is flattened.
//!
//! Both offsets (`e` and `e·x`) are rounded up to `price_tick` before being
//! applied to theo, so every price sits a whole number of ticks from theo
//! and mirrored positions give mirrored quotes.

use bitmm_core::{round_up_to_tick, OrderIntent, OrderSide};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::MakerConfig;
use crate::fair_value::FairValue;

/// What the engine wants quoted this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDecision {
    pub theo: Decimal,
    /// Volatility-scaled edge, floored at `min_edge`.
    pub edge: Decimal,
    /// 0-3 orders in placement order.
    pub intents: Vec<OrderIntent>,
}

/// Position band, see module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Flat,
    MaxShort,
    MaxLong,
    PartialShort,
    PartialLong,
}

/// Classify a position into its band.
pub fn band(position: Decimal, config: &MakerConfig) -> Band {
    let max = config.max_size;
    let min = config.min_size;
    if position.abs() < min {
        Band::Flat
    } else if position <= -max + min {
        Band::MaxShort
    } else if position >= max - min {
        Band::MaxLong
    } else if position <= -min {
        Band::PartialShort
    } else {
        Band::PartialLong
    }
}

/// Edge used for quoting: `max(volatility, min_edge)`.
pub fn edge(volatility: Decimal, config: &MakerConfig) -> Decimal {
    volatility.max(config.min_edge)
}

/// Full decision for one cycle.
pub fn decide(fair_value: &FairValue, position: Decimal, config: &MakerConfig) -> QuoteDecision {
    let edge = edge(fair_value.volatility, config);
    QuoteDecision {
        theo: fair_value.theo,
        edge,
        intents: calculate_intents(position, fair_value.theo, edge, config),
    }
}

/// Orders to rest for `position` around `theo`.
///
/// Orders whose size or price is not positive are dropped.
pub fn calculate_intents(
    position: Decimal,
    theo: Decimal,
    edge: Decimal,
    config: &MakerConfig,
) -> Vec<OrderIntent> {
    let max = config.max_size;
    let offset = round_up_to_tick(edge, config.price_tick);
    let exit_offset = round_up_to_tick(edge * config.exit_edge_factor, config.price_tick);
    let bid = theo - offset;
    let ask = theo + offset;
    let exit_bid = theo - exit_offset;
    let exit_ask = theo + exit_offset;

    let raw: Vec<(OrderSide, Decimal, Decimal)> = match band(position, config) {
        Band::Flat => vec![(OrderSide::Buy, max, bid), (OrderSide::Sell, max, ask)],
        Band::MaxShort => vec![(OrderSide::Buy, -position, exit_bid)],
        Band::MaxLong => vec![(OrderSide::Sell, position, exit_ask)],
        Band::PartialShort => vec![
            (OrderSide::Buy, max, bid),
            (OrderSide::Buy, -position, exit_bid),
            (OrderSide::Sell, max + position, ask),
        ],
        Band::PartialLong => vec![
            (OrderSide::Buy, max - position, bid),
            (OrderSide::Sell, position, exit_ask),
            (OrderSide::Sell, max, ask),
        ],
    };

    raw.into_iter()
        .filter_map(|(side, size, price)| {
            match OrderIntent::new(side, size, price) {
                Ok(intent) => Some(intent),
                Err(e) => {
                    debug!(position = %position, theo = %theo, error = %e, "Dropping collapsed order");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> MakerConfig {
        MakerConfig {
            max_size: dec!(1.0),
            min_size: dec!(0.05),
            exit_edge_factor: dec!(0.5),
            ..Default::default()
        }
    }

    fn summary(intents: &[OrderIntent]) -> Vec<(OrderSide, Decimal, Decimal)> {
        intents
            .iter()
            .map(|i| (i.side, i.size.inner(), i.price.inner()))
            .collect()
    }

    #[test]
    fn test_partial_long_scenario() {
        let intents = calculate_intents(dec!(0.6), dec!(100.0), dec!(0.10), &config());
        assert_eq!(
            summary(&intents),
            vec![
                (OrderSide::Buy, dec!(0.4), dec!(99.90)),
                (OrderSide::Sell, dec!(0.6), dec!(100.05)),
                (OrderSide::Sell, dec!(1.0), dec!(100.10)),
            ]
        );
    }

    #[test]
    fn test_flat_scenario() {
        let intents = calculate_intents(dec!(0.0), dec!(100.0), dec!(0.10), &config());
        assert_eq!(
            summary(&intents),
            vec![
                (OrderSide::Buy, dec!(1.0), dec!(99.90)),
                (OrderSide::Sell, dec!(1.0), dec!(100.10)),
            ]
        );
    }

    #[test]
    fn test_max_long_scenario() {
        let intents = calculate_intents(dec!(0.97), dec!(100.0), dec!(0.10), &config());
        assert_eq!(summary(&intents), vec![(OrderSide::Sell, dec!(0.97), dec!(100.05))]);
    }

    #[test]
    fn test_partial_short() {
        let intents = calculate_intents(dec!(-0.3), dec!(100.0), dec!(0.10), &config());
        assert_eq!(
            summary(&intents),
            vec![
                (OrderSide::Buy, dec!(1.0), dec!(99.90)),
                (OrderSide::Buy, dec!(0.3), dec!(99.95)),
                (OrderSide::Sell, dec!(0.7), dec!(100.10)),
            ]
        );
    }

    #[test]
    fn test_max_short_beyond_cap() {
        let intents = calculate_intents(dec!(-2.0), dec!(100.0), dec!(0.10), &config());
        assert_eq!(summary(&intents), vec![(OrderSide::Buy, dec!(2.0), dec!(99.95))]);
    }

    #[test]
    fn test_boundaries_fall_into_max_bands() {
        let config = config();
        assert_eq!(band(dec!(0.95), &config), Band::MaxLong);
        assert_eq!(band(dec!(-0.95), &config), Band::MaxShort);
        assert_eq!(band(dec!(0.05), &config), Band::PartialLong);
        assert_eq!(band(dec!(-0.05), &config), Band::PartialShort);
        assert_eq!(band(dec!(0.0499), &config), Band::Flat);
    }

    #[test]
    fn test_offsets_rounded_up_to_tick() {
        // edge 0.1234 -> 0.13, exit 0.0617 -> 0.07
        let intents = calculate_intents(dec!(0.6), dec!(100.003), dec!(0.1234), &config());
        assert_eq!(
            summary(&intents),
            vec![
                (OrderSide::Buy, dec!(0.4), dec!(99.873)),
                (OrderSide::Sell, dec!(0.6), dec!(100.073)),
                (OrderSide::Sell, dec!(1.0), dec!(100.133)),
            ]
        );
    }

    #[test]
    fn test_off_grid_theo_stays_symmetric() {
        let theo = dec!(100.003);
        let long: Vec<_> = calculate_intents(dec!(0.6), theo, dec!(0.10), &config())
            .iter()
            .map(|i| i.mirrored(theo))
            .collect();
        let short = calculate_intents(dec!(-0.6), theo, dec!(0.10), &config());

        let mut long = summary(&long);
        let mut short = summary(&short);
        long.sort_by_key(|(_, size, price)| (*price, *size));
        short.sort_by_key(|(_, size, price)| (*price, *size));
        assert_eq!(long, short);
        assert_eq!(
            short,
            vec![
                (OrderSide::Buy, dec!(1.0), dec!(99.903)),
                (OrderSide::Buy, dec!(0.6), dec!(99.953)),
                (OrderSide::Sell, dec!(0.4), dec!(100.103)),
            ]
        );
    }

    #[test]
    fn test_collapsed_orders_are_dropped() {
        // Bid would be priced below zero.
        let intents = calculate_intents(Decimal::ZERO, dec!(0.05), dec!(0.10), &config());
        assert_eq!(summary(&intents), vec![(OrderSide::Sell, dec!(1.0), dec!(0.15))]);
    }

    #[test]
    fn test_edge_is_floored() {
        let config = config();
        assert_eq!(edge(dec!(0.01), &config), config.min_edge);
        assert_eq!(edge(dec!(0.5), &config), dec!(0.5));
    }

    #[test]
    fn test_decide_uses_floored_edge() {
        let fv = FairValue {
            theo: dec!(100),
            volatility: dec!(0.01),
            trades: 5,
        };
        let decision = decide(&fv, Decimal::ZERO, &config());
        assert_eq!(decision.edge, dec!(0.10));
        assert_eq!(decision.intents[0].price.inner(), dec!(99.90));

        let fv = FairValue {
            volatility: dec!(0.2),
            ..fv
        };
        let decision = decide(&fv, Decimal::ZERO, &config());
        assert_eq!(decision.edge, dec!(0.2));
        assert_eq!(decision.intents.len(), 2);
    }
}
