//! Error types for the agent

use thiserror::Error;

/// Result type alias using our AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Market payload could not be turned into token quotes
    #[error("Malformed market data: {0}")]
    MalformedMarketData(String),

    /// Held position reported a zero quantity
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Token name chosen by the oracle is not an outcome of the market
    #[error("Unknown token '{token}' (market offers {available:?})")]
    UnknownToken {
        token: String,
        available: Vec<String>,
    },

    /// Requested order size is not a positive integer
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Market id chosen by the oracle is not among the candidates
    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    /// Event id chosen by the oracle is not among the candidates
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Oracle reply did not match the expected tool-call schema
    #[error("Malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    /// Data provider could not be reached or answered with an error status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Exchange rejected or failed to accept an order
    #[error("Exchange error: {0}")]
    ExchangeError(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Filesystem errors from the audit journal
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication and signing errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Short machine-readable name used in audit records
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::MalformedMarketData(_) => "MalformedMarketData",
            AgentError::DivisionByZero(_) => "DivisionByZero",
            AgentError::UnknownToken { .. } => "UnknownToken",
            AgentError::InvalidSize(_) => "InvalidSize",
            AgentError::UnknownMarket(_) => "UnknownMarket",
            AgentError::UnknownEvent(_) => "UnknownEvent",
            AgentError::MalformedOracleResponse(_) => "MalformedOracleResponse",
            AgentError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            AgentError::ExchangeError(_) => "ExchangeError",
            AgentError::HttpRequest(_) => "HttpRequest",
            AgentError::JsonParse(_) => "JsonParse",
            AgentError::Io(_) => "Io",
            AgentError::Authentication(_) => "Authentication",
            AgentError::Configuration(_) => "Configuration",
        }
    }
}
