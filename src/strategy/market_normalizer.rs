//! Gamma payloads to [`MarketSnapshot`]s, plus the buy-candidate filter

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::common::errors::{AgentError, Result};
use crate::common::types::{EventSnapshot, MarketSnapshot, TokenQuote};
use crate::polymarket::messages::{EncodedList, GammaEvent, GammaMarket};

/// Stateless normalizer; the same payload always yields the same snapshot
#[derive(Debug, Clone)]
pub struct MarketNormalizer {
    /// Candidates whose highest outcome price exceeds this are dropped
    max_higher_price: Decimal,
}

impl MarketNormalizer {
    pub fn new(max_higher_price: Decimal) -> Self {
        Self { max_higher_price }
    }

    /// Parse the three aligned outcome sequences of a market
    pub fn normalize(&self, raw: &GammaMarket) -> Result<MarketSnapshot> {
        let names = decode_list(&raw.id, "outcomes", raw.outcomes.as_ref())?;
        let prices = decode_list(&raw.id, "outcomePrices", raw.outcome_prices.as_ref())?;
        let token_ids = decode_list(&raw.id, "clobTokenIds", raw.clob_token_ids.as_ref())?;

        if names.len() != prices.len() || names.len() != token_ids.len() {
            return Err(AgentError::MalformedMarketData(format!(
                "market {}: {} outcomes, {} prices, {} token ids",
                raw.id,
                names.len(),
                prices.len(),
                token_ids.len()
            )));
        }

        let outcomes = names
            .iter()
            .zip(prices.iter())
            .zip(token_ids.iter())
            .map(|((name, price), token_id)| {
                Ok(TokenQuote {
                    token_name: as_text(name).ok_or_else(|| {
                        AgentError::MalformedMarketData(format!(
                            "market {}: outcome name {} is not text",
                            raw.id, name
                        ))
                    })?,
                    token_id: as_text(token_id).ok_or_else(|| {
                        AgentError::MalformedMarketData(format!(
                            "market {}: token id {} is not text",
                            raw.id, token_id
                        ))
                    })?,
                    price: parse_price(&raw.id, price)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let condition_id = raw.condition_id.clone().ok_or_else(|| {
            AgentError::MalformedMarketData(format!("market {}: missing conditionId", raw.id))
        })?;

        Ok(MarketSnapshot {
            market_id: raw.id.clone(),
            condition_id,
            question: raw.question.clone(),
            description: raw.description.clone(),
            end_date: raw.end_date.clone(),
            outcomes,
        })
    }

    /// Normalize an event, skipping closed markets and markets that fail to parse
    pub fn normalize_event(&self, raw: &GammaEvent) -> EventSnapshot {
        let markets = raw
            .markets
            .iter()
            .filter(|m| is_open(m))
            .filter_map(|m| match self.normalize(m) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Skipping market in event {}: {}", raw.id, e);
                    None
                }
            })
            .collect();

        EventSnapshot {
            event_id: raw.id.clone(),
            title: raw.title.clone(),
            description: raw.description.clone(),
            liquidity: raw.liquidity.as_deref().and_then(|s| Decimal::from_str(s).ok()),
            volume: raw.volume.as_deref().and_then(|s| Decimal::from_str(s).ok()),
            markets,
        }
    }

    /// True if a market is worth buying into
    ///
    /// The market must be binary, list "Yes" first, and have no outcome
    /// priced above the ceiling.
    pub fn is_candidate(&self, market: &MarketSnapshot) -> bool {
        if !market.is_binary() {
            return false;
        }
        if market.outcomes.first().map(|q| q.token_name.as_str()) != Some("Yes") {
            return false;
        }
        match market.max_price() {
            Some(max) => max <= self.max_higher_price,
            None => false,
        }
    }

    /// Open candidate markets across a set of events, in listing order
    pub fn candidates(&self, events: &[GammaEvent]) -> Vec<MarketSnapshot> {
        let candidates: Vec<MarketSnapshot> = events
            .iter()
            .flat_map(|event| event.markets.iter())
            .filter(|m| is_open(m))
            .filter_map(|m| match self.normalize(m) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Skipping market {}: {}", m.id, e);
                    None
                }
            })
            .filter(|m| self.is_candidate(m))
            .collect();

        debug!("{} candidate markets from {} events", candidates.len(), events.len());
        candidates
    }

    /// Candidate markets within one event
    pub fn event_candidates(&self, event: &EventSnapshot) -> Vec<MarketSnapshot> {
        event
            .markets
            .iter()
            .filter(|m| self.is_candidate(m))
            .cloned()
            .collect()
    }
}

/// Still trading: not closed and not deactivated
fn is_open(market: &GammaMarket) -> bool {
    market.closed != Some(true) && market.active != Some(false)
}

fn decode_list(market_id: &str, field: &str, list: Option<&EncodedList>) -> Result<Vec<Value>> {
    let list = list.ok_or_else(|| {
        AgentError::MalformedMarketData(format!("market {}: missing {}", market_id, field))
    })?;
    list.decode().map_err(|e| {
        AgentError::MalformedMarketData(format!("market {}: bad {}: {}", market_id, field, e))
    })
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_price(market_id: &str, value: &Value) -> Result<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };

    match parsed {
        Some(price) if price >= Decimal::ZERO && price <= Decimal::ONE => Ok(price),
        _ => Err(AgentError::MalformedMarketData(format!(
            "market {}: price {} is not a decimal in [0, 1]",
            market_id, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn raw_market(outcomes: &str, prices: &str, tokens: &str) -> GammaMarket {
        serde_json::from_value(serde_json::json!({
            "id": "516710",
            "question": "Will it rain tomorrow?",
            "conditionId": "0xabc",
            "outcomes": outcomes,
            "outcomePrices": prices,
            "clobTokenIds": tokens,
        }))
        .unwrap()
    }

    fn normalizer() -> MarketNormalizer {
        MarketNormalizer::new(dec!(0.90))
    }

    #[test]
    fn test_normalize_encoded_lists() {
        let raw = raw_market(r#"["Yes", "No"]"#, r#"["0.6", "0.4"]"#, r#"["111", "222"]"#);
        let market = normalizer().normalize(&raw).unwrap();

        assert_eq!(market.condition_id, "0xabc");
        assert_eq!(market.token_names(), vec!["Yes", "No"]);
        assert_eq!(market.quote("No").unwrap().token_id, "222");
        assert_eq!(market.quote("Yes").unwrap().price, dec!(0.6));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = raw_market(r#"["Yes", "No"]"#, r#"["0.6", "0.4"]"#, r#"["111", "222"]"#);
        let n = normalizer();
        assert_eq!(n.normalize(&raw).unwrap(), n.normalize(&raw).unwrap());
    }

    #[test]
    fn test_unequal_lengths_are_malformed() {
        let raw = raw_market(r#"["Yes", "No"]"#, r#"["0.6"]"#, r#"["111", "222"]"#);
        assert!(matches!(
            normalizer().normalize(&raw),
            Err(AgentError::MalformedMarketData(_))
        ));
    }

    #[test]
    fn test_out_of_range_price_is_malformed() {
        let raw = raw_market(r#"["Yes", "No"]"#, r#"["1.2", "-0.2"]"#, r#"["111", "222"]"#);
        assert!(matches!(
            normalizer().normalize(&raw),
            Err(AgentError::MalformedMarketData(_))
        ));

        let raw = raw_market(r#"["Yes", "No"]"#, r#"["abc", "0.5"]"#, r#"["111", "222"]"#);
        assert!(matches!(
            normalizer().normalize(&raw),
            Err(AgentError::MalformedMarketData(_))
        ));
    }

    #[test]
    fn test_candidate_filter() {
        let n = normalizer();

        let flipped = n
            .normalize(&raw_market(r#"["No", "Yes"]"#, r#"["0.6", "0.4"]"#, r#"["1", "2"]"#))
            .unwrap();
        assert!(!n.is_candidate(&flipped));

        let near_certain = n
            .normalize(&raw_market(r#"["Yes", "No"]"#, r#"["0.92", "0.08"]"#, r#"["1", "2"]"#))
            .unwrap();
        assert!(!n.is_candidate(&near_certain));

        let open = n
            .normalize(&raw_market(r#"["Yes", "No"]"#, r#"["0.6", "0.4"]"#, r#"["1", "2"]"#))
            .unwrap();
        assert!(n.is_candidate(&open));
    }

    #[test]
    fn test_candidates_skip_bad_and_closed_markets() {
        let events: Vec<GammaEvent> = serde_json::from_value(serde_json::json!([{
            "id": 1,
            "title": "Weather",
            "markets": [
                {"id": "a", "conditionId": "0x1", "outcomes": "[\"Yes\",\"No\"]",
                 "outcomePrices": "[\"0.5\",\"0.5\"]", "clobTokenIds": "[\"1\",\"2\"]"},
                {"id": "b", "conditionId": "0x2", "outcomes": "[\"Yes\",\"No\"]",
                 "outcomePrices": "[\"0.5\"]", "clobTokenIds": "[\"3\",\"4\"]"},
                {"id": "c", "conditionId": "0x3", "closed": true, "outcomes": "[\"Yes\",\"No\"]",
                 "outcomePrices": "[\"0.5\",\"0.5\"]", "clobTokenIds": "[\"5\",\"6\"]"}
            ]
        }]))
        .unwrap();

        let candidates = normalizer().candidates(&events);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].market_id, "a");

        let event = normalizer().normalize_event(&events[0]);
        assert_eq!(event.event_id, "1");
        assert_eq!(event.markets.len(), 1);
        assert_eq!(normalizer().event_candidates(&event), candidates);
    }
}
