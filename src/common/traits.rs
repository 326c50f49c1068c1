//! Trait definitions for the agent's external collaborators
//!
//! The orchestrator only talks to the outside world through these seams, so
//! every network dependency can be swapped for a fake in tests.

use async_trait::async_trait;

use super::errors::Result;
use super::types::{OrderDecision, OrderReceipt, PricePoint};
use crate::oracle::messages::{OracleReply, OracleRequest};
use crate::polymarket::messages::{GammaEvent, GammaMarket, PositionRecord};
use crate::strategy::types::CycleRecord;

/// Query parameters for event discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Tag slug to narrow the listing (None = all tags)
    pub tag_slug: Option<String>,
    /// Maximum number of events
    pub limit: u32,
    /// Minimum traded volume
    pub volume_min: u64,
}

impl EventFilter {
    pub fn new(tag_slug: Option<String>, limit: u32, volume_min: u64) -> Self {
        Self {
            tag_slug,
            limit,
            volume_min,
        }
    }

    /// Same filter without the tag restriction
    pub fn untagged(&self) -> Self {
        Self {
            tag_slug: None,
            ..self.clone()
        }
    }
}

/// Source of raw market and position records
///
/// Implementations return exchange payloads untouched; the strategy
/// normalizers own every interpretation of them.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// List open events, newest first
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<GammaEvent>>;

    /// Fetch one market by its market id
    async fn fetch_market(&self, market_id: &str) -> Result<GammaMarket>;

    /// Fetch the markets sharing a condition id
    async fn fetch_markets_by_condition(&self, condition_id: &str) -> Result<Vec<GammaMarket>>;

    /// Fetch every position held by an account
    async fn fetch_positions(&self, account: &str) -> Result<Vec<PositionRecord>>;

    /// Fetch the price history of one outcome token
    async fn fetch_price_history(&self, token_id: &str, interval: &str) -> Result<Vec<PricePoint>>;
}

/// LLM decision oracle
///
/// Replies are untrusted; callers validate them before acting.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn propose(&self, request: &OracleRequest) -> Result<OracleReply>;
}

/// Order submission gateway
///
/// Any error is a submission failure. Callers never retry.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderDecision) -> Result<OrderReceipt>;
}

/// Append-only journal with one record per trading cycle
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &CycleRecord) -> Result<()>;
}

/// Boxed collaborators for dynamic dispatch
pub type BoxedMarketDataProvider = Box<dyn MarketDataProvider>;
pub type BoxedDecisionOracle = Box<dyn DecisionOracle>;
pub type BoxedOrderGateway = Box<dyn OrderGateway>;
pub type BoxedAuditSink = Box<dyn AuditSink>;
