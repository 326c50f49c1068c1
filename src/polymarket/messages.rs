//! Polymarket wire types (Gamma, Data API and CLOB)
//!
//! These mirror the exchange payloads closely and are deliberately lenient:
//! ids and amounts arrive as strings on some endpoints and as numbers on
//! others. Interpretation happens in the strategy normalizers.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Lenient field helpers
// ============================================================================

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Accept a string or a number and keep it as a string
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(value).ok_or_else(|| serde::de::Error::custom("expected string or number"))
}

/// Optional variant of [`string_or_number`]
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

/// A list that the Gamma API ships either as a JSON-encoded string or as a plain array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodedList {
    /// `"[\"Yes\", \"No\"]"`
    Encoded(String),
    /// `["Yes", "No"]`
    Plain(Vec<Value>),
}

impl EncodedList {
    /// Decode into raw JSON values, parsing the string form if needed
    pub fn decode(&self) -> std::result::Result<Vec<Value>, serde_json::Error> {
        match self {
            EncodedList::Encoded(s) => serde_json::from_str(s),
            EncodedList::Plain(values) => Ok(values.clone()),
        }
    }
}

impl From<Vec<&str>> for EncodedList {
    fn from(items: Vec<&str>) -> Self {
        EncodedList::Plain(items.into_iter().map(|s| Value::String(s.to_string())).collect())
    }
}

// ============================================================================
// Gamma API Response Types (Market Discovery)
// ============================================================================

/// Event from Gamma API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub liquidity: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub volume: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

/// Market from Gamma API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaMarket {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(rename = "conditionId", default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub liquidity: Option<String>,
    /// Outcome labels, aligned with `outcome_prices` and `clob_token_ids`
    #[serde(default)]
    pub outcomes: Option<EncodedList>,
    #[serde(rename = "outcomePrices", default)]
    pub outcome_prices: Option<EncodedList>,
    #[serde(rename = "clobTokenIds", default)]
    pub clob_token_ids: Option<EncodedList>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
}

// ============================================================================
// Data API Types (Account Positions)
// ============================================================================

/// Position record from the Data API `/positions` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    /// Outcome token id
    pub asset: String,
    pub condition_id: String,
    /// Quantity held
    pub size: Decimal,
    /// Average cost per unit
    pub avg_price: Decimal,
    /// Current mark value of the whole position
    pub current_value: Decimal,
    #[serde(default)]
    pub cur_price: Option<Decimal>,
    #[serde(default)]
    pub cash_pnl: Option<Decimal>,
    /// Outcome label of the held token
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub redeemable: Option<bool>,
}

// ============================================================================
// CLOB Types
// ============================================================================

/// One point of the `/prices-history` series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Unix timestamp in seconds
    pub t: i64,
    /// Price at that time
    pub p: Decimal,
}

/// `/prices-history` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

/// L2 credentials returned by `/auth/derive-api-key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

/// Signed order as accepted by the CLOB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrderPayload {
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    pub side: String,
    pub signature_type: u8,
    pub signature: String,
}

/// Body of `POST /order`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOrderRequest {
    pub order: SignedOrderPayload,
    /// API key of the submitting account
    pub owner: String,
    pub order_type: String,
}

/// Response of `POST /order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: Option<String>,
    #[serde(rename = "orderID", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
