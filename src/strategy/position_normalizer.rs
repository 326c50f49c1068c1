//! Data API position records to [`HeldPosition`]s

use rust_decimal::Decimal;

use crate::common::errors::{AgentError, Result};
use crate::common::types::HeldPosition;
use crate::polymarket::messages::PositionRecord;

/// Derive mark price and unrealized P&L from a raw position
///
/// `current_price = current_value / size` and
/// `delta = current_value - size * avg_price`.
pub fn normalize_position(raw: &PositionRecord) -> Result<HeldPosition> {
    if raw.size.is_zero() {
        return Err(AgentError::DivisionByZero(format!(
            "position {} in {} has zero size",
            raw.asset, raw.condition_id
        )));
    }
    if raw.size < Decimal::ZERO {
        return Err(AgentError::MalformedMarketData(format!(
            "position {} in {} has negative size {}",
            raw.asset, raw.condition_id, raw.size
        )));
    }
    if raw.outcome.trim().is_empty() {
        return Err(AgentError::MalformedMarketData(format!(
            "position {} in {} has no outcome label",
            raw.asset, raw.condition_id
        )));
    }

    let current_price = raw.current_value / raw.size;
    let delta = raw.current_value - raw.size * raw.avg_price;

    Ok(HeldPosition {
        condition_id: raw.condition_id.clone(),
        token_name: raw.outcome.clone(),
        token_id: raw.asset.clone(),
        size: raw.size,
        avg_price: raw.avg_price,
        current_price,
        delta,
        title: raw.title.clone(),
    })
}
