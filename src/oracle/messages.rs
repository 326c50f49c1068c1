//! Oracle request/reply types and the Responses API wire format

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::errors::{AgentError, Result};
use crate::polymarket::messages::string_or_number;

pub const SHOW_EVENT_DETAIL: &str = "show_event_detail";
pub const SHOW_MARKET_DETAIL: &str = "show_market_detail";
pub const MAKE_ORDER: &str = "make_order";

/// What the orchestrator is asking the oracle to decide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Pick one event id from a listing
    SelectEvent,
    /// Pick one market id from a listing
    SelectMarket,
    /// Free-text research opinion on one market
    Opinion,
    /// Pick a token and a size to buy
    PlaceOrder,
    /// Free-text hold/sell verdict on a held position
    HoldOrSell,
}

impl DecisionKind {
    /// Function the oracle is forced to call, if this kind expects a tool call
    pub fn forced_tool(&self) -> Option<&'static str> {
        match self {
            DecisionKind::SelectEvent => Some(SHOW_EVENT_DETAIL),
            DecisionKind::SelectMarket => Some(SHOW_MARKET_DETAIL),
            DecisionKind::PlaceOrder => Some(MAKE_ORDER),
            DecisionKind::Opinion | DecisionKind::HoldOrSell => None,
        }
    }

    /// Selection steps run with the cheaper reasoning effort
    pub fn is_selection(&self) -> bool {
        matches!(self, DecisionKind::SelectEvent | DecisionKind::SelectMarket)
    }
}

/// One question put to the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub kind: DecisionKind,
    pub prompt: String,
    /// PNG image attached to the prompt, base64 encoded
    #[serde(default, skip_serializing)]
    pub image_base64: Option<String>,
}

impl OracleRequest {
    pub fn new(kind: DecisionKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            image_base64: None,
        }
    }

    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_base64 = Some(image_base64.into());
        self
    }
}

/// Typed function call returned by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    ShowEventDetail { event_id: String },
    ShowMarketDetail { market_id: String },
    /// `size` stays raw until order sizing coerces it
    MakeOrder { token: String, size: Value },
}

#[derive(Deserialize)]
struct EventArgs {
    #[serde(deserialize_with = "string_or_number")]
    event_id: String,
}

#[derive(Deserialize)]
struct MarketArgs {
    #[serde(deserialize_with = "string_or_number")]
    market_id: String,
}

#[derive(Deserialize)]
struct OrderArgs {
    token: String,
    size: Value,
}

impl ToolCall {
    /// Parse a function call from its name and JSON-encoded arguments
    pub fn parse(name: &str, arguments: &str) -> Result<Self> {
        let malformed =
            |e: serde_json::Error| AgentError::MalformedOracleResponse(format!("{}: {}", name, e));

        match name {
            SHOW_EVENT_DETAIL => {
                let args: EventArgs = serde_json::from_str(arguments).map_err(malformed)?;
                Ok(ToolCall::ShowEventDetail {
                    event_id: args.event_id,
                })
            }
            SHOW_MARKET_DETAIL => {
                let args: MarketArgs = serde_json::from_str(arguments).map_err(malformed)?;
                Ok(ToolCall::ShowMarketDetail {
                    market_id: args.market_id,
                })
            }
            MAKE_ORDER => {
                let args: OrderArgs = serde_json::from_str(arguments).map_err(malformed)?;
                Ok(ToolCall::MakeOrder {
                    token: args.token,
                    size: args.size,
                })
            }
            other => Err(AgentError::MalformedOracleResponse(format!(
                "unknown function {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ShowEventDetail { .. } => SHOW_EVENT_DETAIL,
            ToolCall::ShowMarketDetail { .. } => SHOW_MARKET_DETAIL,
            ToolCall::MakeOrder { .. } => MAKE_ORDER,
        }
    }
}

/// Oracle answer: a structured call or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleReply {
    ToolCall(ToolCall),
    Text(String),
}

impl OracleReply {
    pub fn into_tool_call(self) -> Result<ToolCall> {
        match self {
            OracleReply::ToolCall(call) => Ok(call),
            OracleReply::Text(text) => Err(AgentError::MalformedOracleResponse(format!(
                "expected a function call, got text: {}",
                text
            ))),
        }
    }

    pub fn into_text(self) -> Result<String> {
        match self {
            OracleReply::Text(text) => Ok(text),
            OracleReply::ToolCall(call) => Err(AgentError::MalformedOracleResponse(format!(
                "expected text, got function call {}",
                call.name()
            ))),
        }
    }
}

/// Function tools offered to the model
pub fn tool_definitions() -> Value {
    json!([
        {
            "type": "function",
            "name": SHOW_EVENT_DETAIL,
            "description": "Show the details of the given event. The event id must be one of the listed candidates.",
            "parameters": {
                "type": "object",
                "properties": {
                    "event_id": {"type": "string", "description": "Identifier of one listed event"}
                },
                "required": ["event_id"],
                "additionalProperties": false
            }
        },
        {
            "type": "function",
            "name": SHOW_MARKET_DETAIL,
            "description": "Show the details of the given market. The market id must be one of the listed candidates.",
            "parameters": {
                "type": "object",
                "properties": {
                    "market_id": {"type": "string", "description": "Identifier of one listed market"}
                },
                "required": ["market_id"],
                "additionalProperties": false
            }
        },
        {
            "type": "function",
            "name": MAKE_ORDER,
            "description": "Buy the given number of the named outcome token.",
            "parameters": {
                "type": "object",
                "properties": {
                    "token": {"type": "string", "description": "Outcome token to buy (Yes or No)"},
                    "size": {"type": "number", "description": "Number of tokens to buy"}
                },
                "required": ["token", "size"],
                "additionalProperties": false
            }
        }
    ])
}

// ============================================================================
// Responses API wire types
// ============================================================================

/// Subset of a Responses API reply the agent reads
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesApiResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    FunctionCall { name: String, arguments: String },
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl ResponsesApiResponse {
    /// First function call in the output, as (name, arguments)
    pub fn first_function_call(&self) -> Option<(&str, &str)> {
        self.output.iter().find_map(|item| match item {
            OutputItem::FunctionCall { name, arguments } => Some((name.as_str(), arguments.as_str())),
            _ => None,
        })
    }

    /// Concatenated text of all message outputs
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                _ => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                ContentPart::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
