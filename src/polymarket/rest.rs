//! REST API client for the Polymarket Gamma, Data and CLOB read endpoints

use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::*;
use crate::common::errors::{AgentError, Result};
use crate::common::traits::EventFilter;
use crate::common::types::PricePoint;

/// Read-only REST client for market discovery, positions and price history
#[derive(Debug, Clone)]
pub struct PolymarketRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the CLOB API
    base_url: String,
    /// Base URL for the Gamma API
    gamma_url: String,
    /// Base URL for the Data API
    data_url: String,
}

impl PolymarketRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str, gamma_url: &str, data_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, gamma_url, data_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(
        base_url: &str,
        gamma_url: &str,
        data_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            gamma_url: gamma_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON document, mapping transport and status failures to `UpstreamUnavailable`
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::UpstreamUnavailable(format!(
                "{} returned status {}: {}",
                url, status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("{}: {}", url, e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    // ========================================================================
    // Public Endpoints (No Authentication Required)
    // ========================================================================

    /// Check if the CLOB API is healthy
    #[instrument(skip(self))]
    pub async fn get_ok(&self) -> Result<bool> {
        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Get the price history of one outcome token
    #[instrument(skip(self))]
    pub async fn get_price_history(&self, token_id: &str, interval: &str) -> Result<Vec<PricePoint>> {
        let url = format!("{}/prices-history", self.base_url);
        let query = [
            ("market", token_id.to_string()),
            ("interval", interval.to_string()),
        ];

        let response: PriceHistoryResponse = self.get_json(&url, &query).await?;
        Ok(response
            .history
            .into_iter()
            .filter_map(|point| {
                Utc.timestamp_opt(point.t, 0)
                    .single()
                    .map(|timestamp| PricePoint {
                        timestamp,
                        price: point.p,
                    })
            })
            .collect())
    }

    // ========================================================================
    // Gamma API Endpoints (Market Discovery)
    // ========================================================================

    /// Get open events, newest first
    #[instrument(skip(self))]
    pub async fn get_events(&self, filter: &EventFilter) -> Result<Vec<GammaEvent>> {
        let url = format!("{}/events", self.gamma_url);
        let mut query = vec![
            ("closed", "false".to_string()),
            ("active", "true".to_string()),
            ("limit", filter.limit.to_string()),
            ("offset", "0".to_string()),
            ("order", "id".to_string()),
            ("ascending", "false".to_string()),
            ("volume_min", filter.volume_min.to_string()),
        ];
        if let Some(tag) = &filter.tag_slug {
            query.push(("tag_slug", tag.clone()));
        }

        self.get_json(&url, &query).await
    }

    /// Get a single market by its Gamma id
    #[instrument(skip(self))]
    pub async fn get_market(&self, market_id: &str) -> Result<GammaMarket> {
        let url = format!("{}/markets/{}", self.gamma_url, market_id);
        self.get_json(&url, &[]).await
    }

    /// Get the markets carrying a condition id
    #[instrument(skip(self))]
    pub async fn get_markets_by_condition(&self, condition_id: &str) -> Result<Vec<GammaMarket>> {
        let url = format!("{}/markets", self.gamma_url);
        let query = [("condition_ids", condition_id.to_string())];
        self.get_json(&url, &query).await
    }

    // ========================================================================
    // Data API Endpoints (Account State)
    // ========================================================================

    /// Get the positions held by an account
    #[instrument(skip(self))]
    pub async fn get_positions(&self, user: &str) -> Result<Vec<PositionRecord>> {
        let url = format!("{}/positions", self.data_url);
        let query = [
            ("user", user.to_string()),
            ("sizeThreshold", "0".to_string()),
        ];
        self.get_json(&url, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PolymarketRestClient::new(
            "https://clob.polymarket.com",
            "https://gamma-api.polymarket.com",
            "https://data-api.polymarket.com",
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_normalization() {
        let client = PolymarketRestClient::new(
            "https://clob.polymarket.com/",
            "https://gamma-api.polymarket.com/",
            "https://data-api.polymarket.com/",
        )
        .unwrap();
        assert!(!client.base_url.ends_with('/'));
        assert!(!client.gamma_url.ends_with('/'));
        assert!(!client.data_url.ends_with('/'));
    }
}
