//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{AgentError, Result};

/// Environment variables of the original deployment, mapped onto config keys
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("METAMASK_PRIVATEKEY1", "polymarket.private_key"),
    ("POLYMARKET_ACCOUNT1", "polymarket.funder"),
    ("POLYMARKET_API_KEY", "polymarket.api_key"),
    ("POLYMARKET_API_SECRET", "polymarket.api_secret"),
    ("POLYMARKET_API_PASSPHRASE", "polymarket.api_passphrase"),
    ("OPENAI_API_KEY", "openai.api_key"),
];

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Wallet and API key variables (`METAMASK_PRIVATEKEY1`, `OPENAI_API_KEY`, ...)
/// 2. Environment variables prefixed with APP_ (`APP__TRADING__MAX_HIGHER_PRICE`)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("trading.event_tags")
            .try_parsing(true),
    );

    for (var, key) in LEGACY_ENV_KEYS {
        let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        builder = builder
            .set_override_option(*key, value)
            .map_err(|e| AgentError::Configuration(e.to_string()))?;
    }

    let config = builder
        .build()
        .map_err(|e| AgentError::Configuration(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| AgentError::Configuration(e.to_string()))?;

    app_config.validate()?;
    Ok(app_config)
}
