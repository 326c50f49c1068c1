//! Shared errors, domain types and collaborator traits

pub mod errors;
pub mod traits;
pub mod types;

pub use errors::{AgentError, Result};
pub use traits::{
    AuditSink, BoxedAuditSink, BoxedDecisionOracle, BoxedMarketDataProvider, BoxedOrderGateway,
    DecisionOracle, EventFilter, MarketDataProvider, OrderGateway,
};
pub use types::{
    EventSnapshot, HeldPosition, MarketSnapshot, OrderDecision, OrderOutcome, OrderReceipt,
    PricePoint, Side, TokenQuote,
};
