//! Canonical domain types shared by the normalizers, sizing and orchestration

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One outcome token within a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQuote {
    /// Outcome label, e.g. "Yes" or "No"
    pub token_name: String,
    /// Opaque exchange identifier of the outcome token
    pub token_id: String,
    /// Last quoted price (0.00 to 1.00)
    pub price: Decimal,
}

/// One prediction market at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market_id: String,
    /// Stable cross-reference key used by held positions
    pub condition_id: String,
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Outcome quotes in the order the exchange lists them
    pub outcomes: Vec<TokenQuote>,
}

impl MarketSnapshot {
    /// Find the quote for an outcome by its exact name
    pub fn quote(&self, token_name: &str) -> Option<&TokenQuote> {
        self.outcomes.iter().find(|q| q.token_name == token_name)
    }

    /// Find the quote for an outcome by its token id
    pub fn quote_by_id(&self, token_id: &str) -> Option<&TokenQuote> {
        self.outcomes.iter().find(|q| q.token_id == token_id)
    }

    /// Outcome labels in listing order
    pub fn token_names(&self) -> Vec<String> {
        self.outcomes.iter().map(|q| q.token_name.clone()).collect()
    }

    /// Highest quoted outcome price, if any outcomes are listed
    pub fn max_price(&self) -> Option<Decimal> {
        self.outcomes.iter().map(|q| q.price).max()
    }

    /// True for a two-outcome market
    pub fn is_binary(&self) -> bool {
        self.outcomes.len() == 2
    }
}

/// A group of related markets published together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    pub markets: Vec<MarketSnapshot>,
}

/// A previously acquired stake in one outcome token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldPosition {
    pub condition_id: String,
    pub token_name: String,
    pub token_id: String,
    /// Quantity held
    pub size: Decimal,
    /// Cost basis per unit
    pub avg_price: Decimal,
    /// Mark price per unit
    pub current_price: Decimal,
    /// Signed unrealized P&L in currency units
    pub delta: Decimal,
    /// Market title reported alongside the position
    #[serde(default)]
    pub title: Option<String>,
}

impl HeldPosition {
    /// Fractional return on the cost basis
    ///
    /// Returns `None` when the size or the cost basis is zero.
    pub fn delta_rate(&self) -> Option<Decimal> {
        if self.size.is_zero() || self.avg_price.is_zero() {
            return None;
        }
        Some(self.delta / self.size / self.avg_price)
    }

    /// Amount originally paid for the stake
    pub fn cost_basis(&self) -> Decimal {
        self.size * self.avg_price
    }

    /// Current mark value of the stake
    pub fn current_value(&self) -> Decimal {
        self.cost_basis() + self.delta
    }

    pub fn is_at_loss(&self) -> bool {
        self.delta.is_sign_negative() && !self.delta.is_zero()
    }
}

/// Submission result of an order decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderOutcome {
    Success,
    Failed,
}

/// The validated, sized order produced by one trading cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDecision {
    pub token_id: String,
    pub token_name: String,
    pub side: Side,
    /// Limit price after buffering and clamping
    pub price: Decimal,
    /// Quantity after minimum-notional adjustment
    pub size: Decimal,
    /// Set once, after the gateway answers
    #[serde(default)]
    pub outcome: Option<OrderOutcome>,
}

impl OrderDecision {
    pub fn new(
        token_id: impl Into<String>,
        token_name: impl Into<String>,
        side: Side,
        price: Decimal,
        size: Decimal,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            token_name: token_name.into(),
            side,
            price,
            size,
            outcome: None,
        }
    }

    /// Notional value of the order (size x price)
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }

    /// Consume the pending decision and stamp the submission outcome
    pub fn settle(self, outcome: OrderOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..self
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub order_id: Option<String>,
    pub status: String,
    /// Raw exchange payload kept for the audit journal
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// One point of a token's price history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}
