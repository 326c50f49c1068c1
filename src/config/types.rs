//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{AgentError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Polymarket endpoints and wallet
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    /// LLM oracle endpoint and model
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Trading thresholds and sizing parameters
    #[serde(default)]
    pub trading: TradingConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Reject settings that would break the sizing guarantees
    pub fn validate(&self) -> Result<()> {
        let t = &self.trading;
        if t.max_higher_price <= Decimal::ZERO || t.max_higher_price > Decimal::ONE {
            return Err(AgentError::Configuration(format!(
                "trading.max_higher_price must be in (0, 1], got {}",
                t.max_higher_price
            )));
        }
        if t.buy_buffer_rate <= Decimal::ZERO || t.sell_buffer_rate <= Decimal::ZERO {
            return Err(AgentError::Configuration(
                "trading buffer rates must be positive".to_string(),
            ));
        }
        if t.min_notional <= Decimal::ZERO {
            return Err(AgentError::Configuration(
                "trading.min_notional must be positive".to_string(),
            ));
        }
        if t.tick_size <= Decimal::ZERO || t.tick_size >= dec!(0.5) {
            return Err(AgentError::Configuration(format!(
                "trading.tick_size must be in (0, 0.5), got {}",
                t.tick_size
            )));
        }
        if t.min_buy_tokens == 0 || t.min_buy_tokens > t.max_buy_tokens {
            return Err(AgentError::Configuration(format!(
                "trading buy token bounds are inconsistent: {}..{}",
                t.min_buy_tokens, t.max_buy_tokens
            )));
        }
        if t.sell_keyword.trim().is_empty() {
            return Err(AgentError::Configuration(
                "trading.sell_keyword must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Polymarket platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketConfig {
    /// Wallet private key used to sign orders
    #[serde(default)]
    pub private_key: Option<String>,
    /// Polymarket proxy account holding the funds and positions
    #[serde(default)]
    pub funder: Option<String>,
    /// Pre-issued L2 API key (derived from the wallet when absent)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Pre-issued L2 API secret
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Pre-issued L2 API passphrase
    #[serde(default)]
    pub api_passphrase: Option<String>,
    /// Base URL for the CLOB REST API
    #[serde(default = "default_polymarket_rest_url")]
    pub rest_url: String,
    /// Gamma API URL for market discovery
    #[serde(default = "default_polymarket_gamma_url")]
    pub gamma_url: String,
    /// Data API URL for account positions
    #[serde(default = "default_polymarket_data_url")]
    pub data_url: String,
    /// Polygon chain id
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Order signature type (0 = EOA, 1 = email proxy, 2 = browser proxy)
    #[serde(default = "default_signature_type")]
    pub signature_type: u8,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            funder: None,
            api_key: None,
            api_secret: None,
            api_passphrase: None,
            rest_url: default_polymarket_rest_url(),
            gamma_url: default_polymarket_gamma_url(),
            data_url: default_polymarket_data_url(),
            chain_id: default_chain_id(),
            signature_type: default_signature_type(),
        }
    }
}

impl PolymarketConfig {
    /// L2 credentials, if all three parts are configured
    pub fn api_credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret, &self.api_passphrase) {
            (Some(key), Some(secret), Some(passphrase)) => Some(ApiCredentials::new(
                key.clone(),
                secret.clone(),
                passphrase.clone(),
            )),
            _ => None,
        }
    }
}

fn default_polymarket_rest_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_polymarket_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_polymarket_data_url() -> String {
    "https://data-api.polymarket.com".to_string()
}

fn default_chain_id() -> u64 {
    137
}

fn default_signature_type() -> u8 {
    2
}

/// LLM oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the Responses API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Reasoning effort for market and event selection
    #[serde(default = "default_selection_effort")]
    pub selection_effort: String,
    /// Reasoning effort for opinions, orders and hold/sell calls
    #[serde(default = "default_decision_effort")]
    pub decision_effort: String,
    /// Let the opinion consult use the hosted web search tool
    #[serde(default = "default_true")]
    pub web_search: bool,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_model(),
            selection_effort: default_selection_effort(),
            decision_effort: default_decision_effort(),
            web_search: true,
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

fn default_selection_effort() -> String {
    "low".to_string()
}

fn default_decision_effort() -> String {
    "medium".to_string()
}

fn default_true() -> bool {
    true
}

/// Thresholds of the rule-based escalation filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRules {
    /// Sell outright above this mark price
    #[serde(default = "default_near_certain_price")]
    pub near_certain_price: Decimal,
    /// Sell outright above this delta rate
    #[serde(default = "default_target_multiple")]
    pub target_multiple: Decimal,
    /// Hold while |delta rate| stays below this band
    #[serde(default = "default_stagnation_band")]
    pub stagnation_band: Decimal,
}

impl Default for EscalationRules {
    fn default() -> Self {
        Self {
            near_certain_price: default_near_certain_price(),
            target_multiple: default_target_multiple(),
            stagnation_band: default_stagnation_band(),
        }
    }
}

fn default_near_certain_price() -> Decimal {
    dec!(0.95)
}

fn default_target_multiple() -> Decimal {
    dec!(3.0)
}

fn default_stagnation_band() -> Decimal {
    dec!(0.1)
}

/// Trading parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Event tags the buy cycle draws from
    #[serde(default = "default_event_tags")]
    pub event_tags: Vec<String>,
    /// Events fetched per discovery query
    #[serde(default = "default_event_limit")]
    pub event_limit: u32,
    /// Minimum event volume for discovery
    #[serde(default = "default_volume_min")]
    pub volume_min: u64,
    /// Lower bound of the size the order prompt asks for
    #[serde(default = "default_min_buy_tokens")]
    pub min_buy_tokens: u32,
    /// Upper bound of the size the order prompt asks for
    #[serde(default = "default_max_buy_tokens")]
    pub max_buy_tokens: u32,
    /// Price ceiling for candidates and buy limits
    #[serde(default = "default_max_higher_price")]
    pub max_higher_price: Decimal,
    /// Multiplier applied to the quote when buying
    #[serde(default = "default_buy_buffer_rate")]
    pub buy_buffer_rate: Decimal,
    /// Multiplier applied to the quote when selling
    #[serde(default = "default_sell_buffer_rate")]
    pub sell_buffer_rate: Decimal,
    /// Exchange minimum order value
    #[serde(default = "default_min_notional")]
    pub min_notional: Decimal,
    /// Price increment accepted by the exchange
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Ask the oracle for a researched opinion before the order call
    #[serde(default)]
    pub consult_opinion: bool,
    /// Word whose presence in a hold/sell reply triggers a sell
    #[serde(default = "default_sell_keyword")]
    pub sell_keyword: String,
    /// Interval passed to the price-history endpoint
    #[serde(default = "default_history_interval")]
    pub history_interval: String,
    /// Escalation filter thresholds
    #[serde(default)]
    pub rules: EscalationRules,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            event_tags: default_event_tags(),
            event_limit: default_event_limit(),
            volume_min: default_volume_min(),
            min_buy_tokens: default_min_buy_tokens(),
            max_buy_tokens: default_max_buy_tokens(),
            max_higher_price: default_max_higher_price(),
            buy_buffer_rate: default_buy_buffer_rate(),
            sell_buffer_rate: default_sell_buffer_rate(),
            min_notional: default_min_notional(),
            tick_size: default_tick_size(),
            consult_opinion: false,
            sell_keyword: default_sell_keyword(),
            history_interval: default_history_interval(),
            rules: EscalationRules::default(),
        }
    }
}

fn default_event_tags() -> Vec<String> {
    ["trump", "ukraine", "economy", "technology", "japan"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_event_limit() -> u32 {
    20
}

fn default_volume_min() -> u64 {
    10_000
}

fn default_min_buy_tokens() -> u32 {
    5
}

fn default_max_buy_tokens() -> u32 {
    8
}

fn default_max_higher_price() -> Decimal {
    dec!(0.90)
}

fn default_buy_buffer_rate() -> Decimal {
    dec!(1.02)
}

fn default_sell_buffer_rate() -> Decimal {
    dec!(0.98)
}

fn default_min_notional() -> Decimal {
    dec!(1.0)
}

fn default_tick_size() -> Decimal {
    dec!(0.01)
}

fn default_sell_keyword() -> String {
    "sell".to_string()
}

fn default_history_interval() -> String {
    "6h".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Root directory of the cycle journal
    #[serde(default = "default_audit_dir")]
    pub audit_dir: String,
    /// Log and fake order submission instead of posting
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            audit_dir: default_audit_dir(),
            dry_run: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_audit_dir() -> String {
    "full_logs".to_string()
}

/// API credentials for authenticated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String, passphrase: String) -> Self {
        Self {
            api_key,
            api_secret,
            passphrase,
        }
    }
}
