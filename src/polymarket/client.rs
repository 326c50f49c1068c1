//! Main Polymarket client that serves the agent's market-data needs

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use super::gateway::{ClobOrderGateway, DryRunGateway};
use super::messages::{GammaEvent, GammaMarket, PositionRecord};
use super::rest::PolymarketRestClient;
use super::signer::OrderSigner;
use crate::common::errors::{AgentError, Result};
use crate::common::traits::{BoxedOrderGateway, EventFilter, MarketDataProvider};
use crate::common::types::PricePoint;
use crate::config::types::PolymarketConfig;

/// Polymarket client for market discovery, positions and price history
pub struct PolymarketClient {
    /// REST API client
    rest_client: PolymarketRestClient,
    /// Configuration
    config: PolymarketConfig,
    /// Request timeout applied to every HTTP client built from this config
    timeout: Duration,
}

impl PolymarketClient {
    /// Create a new Polymarket client from configuration
    pub fn new(config: PolymarketConfig, timeout: Duration) -> Result<Self> {
        let rest_client = PolymarketRestClient::with_timeout(
            &config.rest_url,
            &config.gamma_url,
            &config.data_url,
            timeout,
        )?;

        Ok(Self {
            rest_client,
            config,
            timeout,
        })
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &PolymarketRestClient {
        &self.rest_client
    }

    /// Check if the API is healthy
    pub async fn check_health(&self) -> Result<bool> {
        self.rest_client.get_ok().await
    }

    /// Account whose positions the sell cycle manages
    pub fn account(&self) -> Result<String> {
        if let Some(funder) = &self.config.funder {
            return Ok(funder.clone());
        }
        Ok(self.signer()?.address_hex())
    }

    fn signer(&self) -> Result<OrderSigner> {
        let key = self.config.private_key.as_deref().ok_or_else(|| {
            AgentError::Configuration(
                "polymarket.private_key (METAMASK_PRIVATEKEY1) is required".to_string(),
            )
        })?;
        OrderSigner::from_private_key(
            key,
            self.config.chain_id,
            self.config.funder.as_deref(),
            self.config.signature_type,
        )
    }

    /// Build the order gateway: live CLOB submission, or a logging stub for dry runs
    pub fn order_gateway(&self, dry_run: bool) -> Result<BoxedOrderGateway> {
        if dry_run {
            return Ok(Box::new(DryRunGateway));
        }
        let gateway = ClobOrderGateway::new(
            &self.config.rest_url,
            self.signer()?,
            self.config.api_credentials(),
            self.timeout,
        )?;
        Ok(Box::new(gateway))
    }
}

#[async_trait]
impl MarketDataProvider for PolymarketClient {
    #[instrument(skip(self))]
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<GammaEvent>> {
        self.rest_client.get_events(filter).await
    }

    #[instrument(skip(self))]
    async fn fetch_market(&self, market_id: &str) -> Result<GammaMarket> {
        self.rest_client.get_market(market_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_markets_by_condition(&self, condition_id: &str) -> Result<Vec<GammaMarket>> {
        self.rest_client.get_markets_by_condition(condition_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_positions(&self, account: &str) -> Result<Vec<PositionRecord>> {
        self.rest_client.get_positions(account).await
    }

    #[instrument(skip(self))]
    async fn fetch_price_history(&self, token_id: &str, interval: &str) -> Result<Vec<PricePoint>> {
        self.rest_client.get_price_history(token_id, interval).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = PolymarketConfig::default();
        let client = PolymarketClient::new(config, Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_account_requires_wallet_or_funder() {
        let client = PolymarketClient::new(PolymarketConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(matches!(client.account(), Err(AgentError::Configuration(_))));

        let config = PolymarketConfig {
            funder: Some("0xfunder".to_string()),
            ..PolymarketConfig::default()
        };
        let client = PolymarketClient::new(config, Duration::from_secs(5)).unwrap();
        assert_eq!(client.account().unwrap(), "0xfunder");
    }

    #[test]
    fn test_dry_run_gateway_needs_no_wallet() {
        let client = PolymarketClient::new(PolymarketConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(client.order_gateway(true).is_ok());
        assert!(client.order_gateway(false).is_err());
    }
}
