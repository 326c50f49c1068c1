//! Rule-based hold/sell screening ahead of the oracle

use crate::common::types::HeldPosition;
use crate::config::types::EscalationRules;
use crate::strategy::types::Verdict;

/// Resolves obvious hold/sell cases without an oracle call
///
/// Rules are evaluated in order and the first match wins:
/// 1. mark price above `near_certain_price` sells
/// 2. delta rate above `target_multiple` sells
/// 3. |delta rate| below `stagnation_band` holds
/// 4. anything else escalates
#[derive(Debug, Clone, Default)]
pub struct EscalationFilter {
    rules: EscalationRules,
}

impl EscalationFilter {
    pub fn new(rules: EscalationRules) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, position: &HeldPosition) -> Verdict {
        if position.current_price > self.rules.near_certain_price {
            return Verdict::sell("near-certain outcome priced in");
        }

        // No cost basis: only the price rule can decide
        let Some(rate) = position.delta_rate() else {
            return Verdict::escalate("cost basis unavailable");
        };

        if rate > self.rules.target_multiple {
            Verdict::sell("target multiple reached")
        } else if rate.abs() < self.rules.stagnation_band {
            Verdict::hold("no significant price movement")
        } else {
            Verdict::escalate("ambiguous price movement")
        }
    }
}
