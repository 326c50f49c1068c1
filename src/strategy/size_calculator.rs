use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use tracing::debug;

use crate::common::errors::{AgentError, Result};
use crate::common::types::{HeldPosition, MarketSnapshot, OrderDecision, Side};
use crate::config::types::TradingConfig;

/// Turns a trade intent into a submittable [`OrderDecision`]
///
/// # Buy
///
/// `price = min(quote * buy_buffer_rate, max_higher_price)`, snapped to the
/// tick grid. If `requested * price` is under the minimum notional the size
/// becomes `floor(min_notional / price) + 1`.
///
/// # Sell
///
/// `price = quote * sell_buffer_rate`, snapped to the tick grid. The size is
/// always the full held quantity.
///
/// Prices are clamped to `[tick, 1 - tick]`. The size is derived from the
/// final price, so `size * price >= min_notional` holds for every buy.
#[derive(Debug, Clone)]
pub struct OrderSizer {
    buy_buffer_rate: Decimal,
    sell_buffer_rate: Decimal,
    max_higher_price: Decimal,
    min_notional: Decimal,
    tick_size: Decimal,
}

impl OrderSizer {
    pub fn new(config: &TradingConfig) -> Self {
        Self {
            buy_buffer_rate: config.buy_buffer_rate,
            sell_buffer_rate: config.sell_buffer_rate,
            max_higher_price: config.max_higher_price,
            min_notional: config.min_notional,
            tick_size: config.tick_size,
        }
    }

    /// Size a buy of `token_name` from the oracle's raw `requested` size
    pub fn size_buy(
        &self,
        market: &MarketSnapshot,
        token_name: &str,
        requested: &Value,
    ) -> Result<OrderDecision> {
        let quote = market.quote(token_name).ok_or_else(|| AgentError::UnknownToken {
            token: token_name.to_string(),
            available: market.token_names(),
        })?;
        let requested = Decimal::from(coerce_size(requested)?);

        let price = self.buy_price(quote.price);
        let size = self.min_notional_size(price, requested);
        debug!(
            token = %quote.token_name,
            quoted = %quote.price,
            %price,
            %requested,
            %size,
            "Sized buy"
        );

        Ok(OrderDecision::new(
            &quote.token_id,
            &quote.token_name,
            Side::Buy,
            price,
            size,
        ))
    }

    /// Size a full exit of `position` against the market's current quote
    pub fn size_sell(&self, market: &MarketSnapshot, position: &HeldPosition) -> Result<OrderDecision> {
        // a name match only counts inside the position's own market
        let same_condition = market.condition_id == position.condition_id;
        let quote = market
            .quote_by_id(&position.token_id)
            .or_else(|| same_condition.then(|| market.quote(&position.token_name)).flatten())
            .ok_or_else(|| AgentError::UnknownToken {
                token: position.token_name.clone(),
                available: market.token_names(),
            })?;

        let price = self.sell_price(quote.price);
        debug!(
            token = %quote.token_name,
            quoted = %quote.price,
            %price,
            size = %position.size,
            "Sized sell"
        );

        Ok(OrderDecision::new(
            &quote.token_id,
            &quote.token_name,
            Side::Sell,
            price,
            position.size,
        ))
    }

    pub fn buy_price(&self, quoted: Decimal) -> Decimal {
        let price = self.snap(quoted * self.buy_buffer_rate).min(self.max_higher_price);
        self.clamp(price)
    }

    pub fn sell_price(&self, quoted: Decimal) -> Decimal {
        self.clamp(self.snap(quoted * self.sell_buffer_rate))
    }

    /// Raise `requested` until the order meets the minimum notional
    pub fn min_notional_size(&self, price: Decimal, requested: Decimal) -> Decimal {
        if requested * price >= self.min_notional {
            requested
        } else {
            (self.min_notional / price).floor() + Decimal::ONE
        }
    }

    fn snap(&self, price: Decimal) -> Decimal {
        (price / self.tick_size).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            * self.tick_size
    }

    fn clamp(&self, price: Decimal) -> Decimal {
        price.max(self.tick_size).min(Decimal::ONE - self.tick_size).normalize()
    }
}

/// Coerce an oracle-supplied size to a positive whole quantity
///
/// Integers pass through, fractional numbers are truncated toward zero and
/// integer strings are parsed. Anything that ends up non-positive fails.
pub fn coerce_size(requested: &Value) -> Result<u64> {
    let invalid = || AgentError::InvalidSize(format!("cannot use {} as an order size", requested));

    let whole = match requested {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Decimal::from(v)
            } else if let Some(v) = n.as_u64() {
                Decimal::from(v)
            } else {
                n.as_f64()
                    .and_then(Decimal::from_f64)
                    .ok_or_else(invalid)?
                    .trunc()
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map(Decimal::from).map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if whole <= Decimal::ZERO {
        return Err(invalid());
    }
    whole.to_u64().ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::TokenQuote;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn market(yes: Decimal, no: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            market_id: "516710".to_string(),
            condition_id: "0xabc".to_string(),
            question: "Will it rain tomorrow?".to_string(),
            description: None,
            end_date: None,
            outcomes: vec![
                TokenQuote {
                    token_name: "Yes".to_string(),
                    token_id: "111".to_string(),
                    price: yes,
                },
                TokenQuote {
                    token_name: "No".to_string(),
                    token_id: "222".to_string(),
                    price: no,
                },
            ],
        }
    }

    fn sizer() -> OrderSizer {
        OrderSizer::new(&TradingConfig::default())
    }

    #[test]
    fn test_buy_keeps_size_above_minimum() {
        let decision = sizer().size_buy(&market(dec!(0.5), dec!(0.5)), "Yes", &json!(5)).unwrap();

        assert_eq!(decision.token_id, "111");
        assert_eq!(decision.side, Side::Buy);
        assert_eq!(decision.price, dec!(0.51));
        assert_eq!(decision.size, dec!(5));
        assert!(decision.outcome.is_none());
    }

    #[test]
    fn test_buy_raises_size_to_minimum_notional() {
        // 0.05 * 1.02 = 0.051 -> 0.05; 5 * 0.05 < 1 -> floor(20) + 1
        let decision = sizer().size_buy(&market(dec!(0.95), dec!(0.05)), "No", &json!(5)).unwrap();
        assert_eq!(decision.price, dec!(0.05));
        assert_eq!(decision.size, dec!(21));
    }

    #[test]
    fn test_buy_price_is_capped() {
        let decision = sizer().size_buy(&market(dec!(0.89), dec!(0.11)), "Yes", &json!(8)).unwrap();
        assert_eq!(decision.price, dec!(0.90));
    }

    #[test]
    fn test_buy_notional_guarantee_over_price_grid() {
        let s = sizer();
        let mut quoted = Decimal::ZERO;
        while quoted <= Decimal::ONE {
            for requested in 1..=10u64 {
                let price = s.buy_price(quoted);
                let size = s.min_notional_size(price, Decimal::from(requested));
                assert!(size * price >= Decimal::ONE, "quoted {} requested {}", quoted, requested);
                assert!(price > Decimal::ZERO && price < Decimal::ONE);
            }
            quoted += dec!(0.005);
        }
    }

    #[test]
    fn test_zero_quote_buys_at_one_tick() {
        let decision = sizer().size_buy(&market(dec!(1), dec!(0)), "No", &json!(1)).unwrap();
        assert_eq!(decision.price, dec!(0.01));
        assert_eq!(decision.size, dec!(101));
    }

    #[test]
    fn test_unknown_token() {
        let result = sizer().size_buy(&market(dec!(0.5), dec!(0.5)), "Maybe", &json!(5));
        match result {
            Err(AgentError::UnknownToken { token, available }) => {
                assert_eq!(token, "Maybe");
                assert_eq!(available, vec!["Yes", "No"]);
            }
            other => panic!("expected UnknownToken, got {:?}", other),
        }
    }

    #[test]
    fn test_token_match_is_exact() {
        let result = sizer().size_buy(&market(dec!(0.5), dec!(0.5)), "yes", &json!(5));
        assert!(matches!(result, Err(AgentError::UnknownToken { .. })));
    }

    #[test]
    fn test_coerce_size() {
        assert_eq!(coerce_size(&json!(7)).unwrap(), 7);
        assert_eq!(coerce_size(&json!(6.9)).unwrap(), 6);
        assert_eq!(coerce_size(&json!("8")).unwrap(), 8);

        for bad in [json!(0), json!(-3), json!(0.4), json!("five"), json!("5.5"), json!(null), json!([5])] {
            assert!(
                matches!(coerce_size(&bad), Err(AgentError::InvalidSize(_))),
                "{} should be invalid",
                bad
            );
        }
    }

    #[test]
    fn test_sell_liquidates_full_position() {
        let position = HeldPosition {
            condition_id: "0xabc".to_string(),
            token_name: "Yes".to_string(),
            token_id: "111".to_string(),
            size: dec!(12.5),
            avg_price: dec!(0.4),
            current_price: dec!(0.6),
            delta: dec!(2.5),
            title: None,
        };
        let decision = sizer().size_sell(&market(dec!(0.6), dec!(0.4)), &position).unwrap();

        assert_eq!(decision.side, Side::Sell);
        assert_eq!(decision.size, dec!(12.5));
        // 0.6 * 0.98 = 0.588 -> 0.59
        assert_eq!(decision.price, dec!(0.59));
        assert_eq!(decision.token_id, "111");
    }

    #[test]
    fn test_sell_of_token_missing_from_market() {
        let position = HeldPosition {
            condition_id: "0xabc".to_string(),
            token_name: "Maybe".to_string(),
            token_id: "999".to_string(),
            size: dec!(3),
            avg_price: dec!(0.4),
            current_price: dec!(0.6),
            delta: dec!(0.6),
            title: None,
        };
        let result = sizer().size_sell(&market(dec!(0.6), dec!(0.4)), &position);
        assert!(matches!(result, Err(AgentError::UnknownToken { .. })));
    }
    #[test]
    fn test_sell_ignores_name_match_in_other_condition() {
        let position = HeldPosition {
            condition_id: "0xheld".to_string(),
            token_name: "Yes".to_string(),
            token_id: "999".to_string(),
            size: dec!(10),
            avg_price: dec!(0.5),
            current_price: dec!(0.97),
            delta: dec!(4.7),
            title: None,
        };
        let result = sizer().size_sell(&market(dec!(0.6), dec!(0.4)), &position);
        assert!(matches!(result, Err(AgentError::UnknownToken { .. })));
    }

    #[test]
    fn test_sell_falls_back_to_name_in_same_condition() {
        let position = HeldPosition {
            condition_id: "0xabc".to_string(),
            token_name: "No".to_string(),
            token_id: "stale-id".to_string(),
            size: dec!(4),
            avg_price: dec!(0.3),
            current_price: dec!(0.4),
            delta: dec!(0.4),
            title: None,
        };
        let decision = sizer().size_sell(&market(dec!(0.6), dec!(0.4)), &position).unwrap();
        assert_eq!(decision.token_id, "222");
    }
}
