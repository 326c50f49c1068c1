//! Common test utilities and fixtures
#![allow(dead_code)]

use mockall::mock;
use serde_json::json;
use std::sync::{Arc, Mutex};

use polymarket_agent::common::errors::{AgentError, Result};
use polymarket_agent::common::traits::{
    AuditSink, DecisionOracle, EventFilter, MarketDataProvider, OrderGateway,
};
use polymarket_agent::common::types::{OrderDecision, OrderReceipt, PricePoint};
use polymarket_agent::config::types::TradingConfig;
use polymarket_agent::oracle::messages::{OracleReply, OracleRequest, ToolCall};
use polymarket_agent::polymarket::messages::{GammaEvent, GammaMarket, PositionRecord};
use polymarket_agent::strategy::types::CycleRecord;

mock! {
    pub Provider {}

    #[async_trait::async_trait]
    impl MarketDataProvider for Provider {
        async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<GammaEvent>>;
        async fn fetch_market(&self, market_id: &str) -> Result<GammaMarket>;
        async fn fetch_markets_by_condition(&self, condition_id: &str) -> Result<Vec<GammaMarket>>;
        async fn fetch_positions(&self, account: &str) -> Result<Vec<PositionRecord>>;
        async fn fetch_price_history(&self, token_id: &str, interval: &str) -> Result<Vec<PricePoint>>;
    }
}

mock! {
    pub Oracle {}

    #[async_trait::async_trait]
    impl DecisionOracle for Oracle {
        async fn propose(&self, request: &OracleRequest) -> Result<OracleReply>;
    }
}

mock! {
    pub Gateway {}

    #[async_trait::async_trait]
    impl OrderGateway for Gateway {
        async fn submit(&self, order: &OrderDecision) -> Result<OrderReceipt>;
    }
}

/// Audit sink that keeps records in memory for inspection
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub records: Arc<Mutex<Vec<CycleRecord>>>,
}

impl RecordingSink {
    pub fn taken(&self) -> Vec<CycleRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingSink {
    fn append(&self, record: &CycleRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Audit sink whose every write fails
pub struct BrokenSink;

impl AuditSink for BrokenSink {
    fn append(&self, _record: &CycleRecord) -> Result<()> {
        Err(AgentError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only journal",
        )))
    }
}

/// Trading parameters with no random tag selection
pub fn trading_config() -> TradingConfig {
    TradingConfig {
        event_tags: Vec::new(),
        ..TradingConfig::default()
    }
}

/// Gamma market with JSON-encoded outcome lists
pub fn gamma_market(id: &str, condition_id: &str, outcomes: [&str; 2], prices: [&str; 2], tokens: [&str; 2]) -> GammaMarket {
    serde_json::from_value(gamma_market_json(id, condition_id, outcomes, prices, tokens))
        .expect("valid market fixture")
}

pub fn gamma_market_json(
    id: &str,
    condition_id: &str,
    outcomes: [&str; 2],
    prices: [&str; 2],
    tokens: [&str; 2],
) -> serde_json::Value {
    json!({
        "id": id,
        "question": format!("Question for market {}?", id),
        "conditionId": condition_id,
        "description": "Resolves according to the official source.",
        "endDate": "2026-12-31T00:00:00Z",
        "outcomes": serde_json::to_string(&outcomes).unwrap(),
        "outcomePrices": serde_json::to_string(&prices).unwrap(),
        "clobTokenIds": serde_json::to_string(&tokens).unwrap(),
        "active": true,
        "closed": false
    })
}

/// Open, uncertain market: Yes 0.6 / No 0.4
pub fn open_market() -> GammaMarket {
    gamma_market("516710", "0xopen", ["Yes", "No"], ["0.6", "0.4"], ["111", "222"])
}

/// Near-certain market that the candidate filter drops
pub fn settled_market() -> GammaMarket {
    gamma_market("516711", "0xsettled", ["Yes", "No"], ["0.95", "0.05"], ["333", "444"])
}

pub fn gamma_event(id: &str, title: &str, markets: Vec<GammaMarket>) -> GammaEvent {
    GammaEvent {
        id: id.to_string(),
        title: title.to_string(),
        slug: None,
        description: Some(format!("{} description", title)),
        end_date: None,
        liquidity: Some("50000".to_string()),
        volume: Some("120000".to_string()),
        active: Some(true),
        markets,
    }
}

pub fn position_record(
    asset: &str,
    condition_id: &str,
    outcome: &str,
    size: &str,
    avg_price: &str,
    current_value: &str,
) -> PositionRecord {
    serde_json::from_value(json!({
        "asset": asset,
        "conditionId": condition_id,
        "size": size,
        "avgPrice": avg_price,
        "currentValue": current_value,
        "outcome": outcome,
        "title": "Question?"
    }))
    .expect("valid position fixture")
}

pub fn receipt(order_id: &str) -> OrderReceipt {
    OrderReceipt {
        order_id: Some(order_id.to_string()),
        status: "live".to_string(),
        raw: json!({"success": true, "orderID": order_id}),
    }
}

pub fn select_market(market_id: &str) -> OracleReply {
    OracleReply::ToolCall(ToolCall::ShowMarketDetail {
        market_id: market_id.to_string(),
    })
}

pub fn make_order(token: &str, size: serde_json::Value) -> OracleReply {
    OracleReply::ToolCall(ToolCall::MakeOrder {
        token: token.to_string(),
        size,
    })
}

/// Sample Gamma `/events` payload as served by the API
pub const EVENTS_RESPONSE: &str = r#"[
    {
        "id": "16085",
        "title": "Fed decision in December?",
        "slug": "fed-decision-in-december",
        "description": "Federal Reserve rate decision.",
        "endDate": "2026-12-10T12:00:00Z",
        "liquidity": 1250000.5,
        "volume": "8900000.12",
        "active": true,
        "markets": [
            {
                "id": "516710",
                "question": "Fed cuts rates by 25 bps?",
                "conditionId": "0xabc",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.62\", \"0.38\"]",
                "clobTokenIds": "[\"111\", \"222\"]",
                "active": true,
                "closed": false
            }
        ]
    }
]"#;

/// Sample Data API `/positions` payload
pub const POSITIONS_RESPONSE: &str = r#"[
    {
        "proxyWallet": "0xfunder",
        "asset": "111",
        "conditionId": "0xabc",
        "size": 12.5,
        "avgPrice": 0.4,
        "initialValue": 5,
        "currentValue": 7.5,
        "cashPnl": 2.5,
        "curPrice": 0.6,
        "outcome": "Yes",
        "title": "Fed cuts rates by 25 bps?",
        "endDate": "2026-12-10",
        "redeemable": false
    }
]"#;
