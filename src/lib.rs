//! PolymarketAgent Library
//!
//! An LLM-assisted trading agent for Polymarket prediction markets: it
//! discovers candidate markets, lets a decision oracle pick trades, screens
//! held positions with deterministic rules, and sizes and submits orders.

pub mod audit;
pub mod common;
pub mod config;
pub mod oracle;
pub mod polymarket;
pub mod strategy;

// Re-export commonly used types
pub use audit::JsonFileAuditSink;
pub use common::errors::{AgentError, Result};
pub use common::types::{
    EventSnapshot, HeldPosition, MarketSnapshot, OrderDecision, OrderOutcome, OrderReceipt, Side,
    TokenQuote,
};
pub use config::types::AppConfig;
pub use oracle::OpenAiOracle;
pub use polymarket::client::PolymarketClient;
pub use polymarket::rest::PolymarketRestClient;

// Strategy types
pub use strategy::{
    CycleKind, CycleRecord, CycleStage, CycleStatus, DecisionOrchestrator, EscalationFilter,
    MarketNormalizer, OrderSizer, Verdict,
};
