//! Strategy module: normalization, screening, sizing and orchestration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DecisionOrchestrator                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MarketDataProvider ──► MarketNormalizer / normalize_position│
//! │       │                                                     │
//! │       ▼ (sell path)                                         │
//! │  EscalationFilter → SELL / HOLD / ESCALATE                  │
//! │       │                                                     │
//! │       ▼ (buy path, or ESCALATE)                             │
//! │  DecisionOracle (untrusted, validated)                      │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  OrderSizer → OrderDecision                                 │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  OrderGateway (one in flight, no retry) → AuditSink         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`MarketNormalizer`]: Gamma markets to [`MarketSnapshot`](crate::common::types::MarketSnapshot)s and the candidate filter
//! - [`normalize_position`]: Data API positions to [`HeldPosition`](crate::common::types::HeldPosition)s
//! - [`EscalationFilter`]: deterministic hold/sell screening
//! - [`OrderSizer`]: buffered limit prices and minimum-notional sizing
//! - [`DecisionOrchestrator`]: the per-cycle state machine

pub mod escalation;
pub mod market_normalizer;
pub mod orchestrator;
pub mod position_normalizer;
pub mod size_calculator;
pub mod types;

pub use escalation::EscalationFilter;
pub use market_normalizer::MarketNormalizer;
pub use orchestrator::DecisionOrchestrator;
pub use position_normalizer::normalize_position;
pub use size_calculator::{coerce_size, OrderSizer};
pub use types::{CycleKind, CycleRecord, CycleStage, CycleStatus, ErrorRecord, StageEntry, Verdict};
