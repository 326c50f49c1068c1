use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::errors::AgentError;
use crate::common::types::{OrderDecision, OrderOutcome, OrderReceipt};

/// Escalation filter output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Exit the position without consulting the oracle
    Sell(String),
    /// Keep the position; the cycle ends without an order
    Hold(String),
    /// Defer to the oracle
    Escalate(String),
}

impl Verdict {
    pub fn sell(reason: impl Into<String>) -> Self {
        Self::Sell(reason.into())
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self::Hold(reason.into())
    }

    pub fn escalate(reason: impl Into<String>) -> Self {
        Self::Escalate(reason.into())
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Sell(r) | Self::Hold(r) | Self::Escalate(r) => r,
        }
    }

    pub fn is_escalate(&self) -> bool {
        matches!(self, Self::Escalate(_))
    }
}

/// Which kind of trading cycle a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleKind {
    Buy,
    Sell,
}

/// Non-terminal states of a trading cycle, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStage {
    CollectContext,
    RuleCheck,
    LlmConsult,
    SizeOrder,
    Submit,
}

/// Terminal state of a trading cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CycleStatus {
    Success,
    Failed,
    /// Ended without placing an order
    Hold,
}

/// One visited stage with whatever it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: CycleStage,
    pub at: DateTime<Utc>,
    pub detail: Value,
}

/// Error captured on a failed cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: String,
    pub message: String,
}

impl From<&AgentError> for ErrorRecord {
    fn from(err: &AgentError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Audit record of one trading cycle
///
/// Stages only move forward. A cycle is finished exactly once, through
/// [`succeed`](Self::succeed), [`fail`](Self::fail) or [`hold`](Self::hold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub started_at: DateTime<Utc>,
    pub kind: CycleKind,
    /// Market id for buys, condition id for sells
    pub subject: String,
    pub stages: Vec<StageEntry>,
    pub decision: Option<OrderDecision>,
    pub receipt: Option<OrderReceipt>,
    pub status: Option<CycleStatus>,
    pub reason: Option<String>,
    pub error: Option<ErrorRecord>,
}

impl CycleRecord {
    pub fn new(kind: CycleKind, subject: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            kind,
            subject: subject.into(),
            stages: Vec::new(),
            decision: None,
            receipt: None,
            status: None,
            reason: None,
            error: None,
        }
    }

    /// Stage the cycle is currently in
    pub fn stage(&self) -> Option<CycleStage> {
        self.stages.last().map(|entry| entry.stage)
    }

    /// Record progress in `stage`
    ///
    /// A stage may be recorded more than once, but never after a later one.
    pub fn enter(&mut self, stage: CycleStage, detail: Value) {
        debug_assert!(
            self.stage().map_or(true, |current| current <= stage),
            "cycle moved backwards from {:?} to {:?}",
            self.stage(),
            stage
        );
        debug_assert!(self.status.is_none(), "cycle already finished");
        self.stages.push(StageEntry {
            stage,
            at: Utc::now(),
            detail,
        });
    }

    pub fn succeed(&mut self, decision: OrderDecision, receipt: OrderReceipt) {
        self.decision = Some(decision.settle(OrderOutcome::Success));
        self.receipt = Some(receipt);
        self.status = Some(CycleStatus::Success);
    }

    /// Finish as FAILED; a pending decision is stamped FAILED as well
    pub fn fail(&mut self, err: &AgentError, decision: Option<OrderDecision>) {
        self.decision = decision.map(|d| d.settle(OrderOutcome::Failed));
        self.error = Some(ErrorRecord::from(err));
        self.status = Some(CycleStatus::Failed);
    }

    pub fn hold(&mut self, reason: impl Into<String>) {
        self.reason = Some(reason.into());
        self.status = Some(CycleStatus::Hold);
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    pub fn visited(&self, stage: CycleStage) -> bool {
        self.stages.iter().any(|entry| entry.stage == stage)
    }
}
