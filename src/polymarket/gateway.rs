//! Order submission gateways
//!
//! [`ClobOrderGateway`] posts signed limit orders to the CLOB.
//! [`DryRunGateway`] only logs them.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::auth::generate_auth_headers;
use super::messages::{ApiKeyResponse, PostOrderRequest, PostOrderResponse};
use super::signer::OrderSigner;
use crate::common::errors::{AgentError, Result};
use crate::common::traits::OrderGateway;
use crate::common::types::{OrderDecision, OrderReceipt};
use crate::config::types::ApiCredentials;

/// Gateway that signs orders and posts them to `POST /order`
#[derive(Debug)]
pub struct ClobOrderGateway {
    client: Client,
    base_url: String,
    signer: OrderSigner,
    /// L2 credentials, derived from the wallet on first use when not configured
    credentials: RwLock<Option<ApiCredentials>>,
}

impl ClobOrderGateway {
    pub fn new(
        base_url: &str,
        signer: OrderSigner,
        credentials: Option<ApiCredentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer,
            credentials: RwLock::new(credentials),
        })
    }

    async fn credentials(&self) -> Result<ApiCredentials> {
        if let Some(creds) = self.credentials.read().await.as_ref() {
            return Ok(creds.clone());
        }

        let derived = self.derive_credentials().await?;
        *self.credentials.write().await = Some(derived.clone());
        Ok(derived)
    }

    /// Derive L2 credentials with an L1 (ClobAuth) signature
    #[instrument(skip(self))]
    async fn derive_credentials(&self) -> Result<ApiCredentials> {
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = 0u64;
        let signature = self.signer.sign_clob_auth(timestamp, nonce)?;
        let url = format!("{}/auth/derive-api-key", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("POLY_ADDRESS", self.signer.address_hex())
            .header("POLY_SIGNATURE", signature)
            .header("POLY_TIMESTAMP", timestamp.to_string())
            .header("POLY_NONCE", nonce.to_string())
            .send()
            .await
            .map_err(|e| AgentError::Authentication(format!("Credential derivation failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Authentication(format!(
                "Credential derivation returned status {}: {}",
                status, body
            )));
        }

        let keys: ApiKeyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Authentication(format!("Invalid credential payload: {}", e)))?;
        info!("Derived CLOB API credentials for {}", self.signer.address_hex());

        Ok(ApiCredentials::new(keys.api_key, keys.secret, keys.passphrase))
    }
}

#[async_trait]
impl OrderGateway for ClobOrderGateway {
    #[instrument(skip(self, order), fields(token_id = %order.token_id, side = %order.side, price = %order.price, size = %order.size))]
    async fn submit(&self, order: &OrderDecision) -> Result<OrderReceipt> {
        let credentials = self.credentials().await?;
        let salt = u64::from(rand::random::<u32>());
        let signed = self.signer.sign_order(order, salt)?;

        let request = PostOrderRequest {
            order: signed,
            owner: credentials.api_key.clone(),
            order_type: "GTC".to_string(),
        };
        let body = serde_json::to_string(&request)?;
        let headers = generate_auth_headers(
            &self.signer.address_hex(),
            &credentials,
            "POST",
            "/order",
            &body,
        )?;

        let url = format!("{}/order", self.base_url);
        let response = headers
            .apply_to_request(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AgentError::ExchangeError(format!("Order post failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AgentError::ExchangeError(format!(
                "Exchange returned status {}: {}",
                status, text
            )));
        }

        let raw: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AgentError::ExchangeError(format!("Invalid order response: {}", e)))?;
        let parsed: PostOrderResponse = serde_json::from_value(raw.clone())
            .map_err(|e| AgentError::ExchangeError(format!("Invalid order response: {}", e)))?;

        if !parsed.success {
            let reason = parsed
                .error_msg
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "order not accepted".to_string());
            warn!("Order rejected: {}", reason);
            return Err(AgentError::ExchangeError(reason));
        }

        info!(order_id = ?parsed.order_id, "Order accepted");
        Ok(OrderReceipt {
            order_id: parsed.order_id,
            status: parsed.status.unwrap_or_else(|| "accepted".to_string()),
            raw,
        })
    }
}

/// Gateway that records orders without touching the exchange
#[derive(Debug, Default, Clone)]
pub struct DryRunGateway;

#[async_trait]
impl OrderGateway for DryRunGateway {
    async fn submit(&self, order: &OrderDecision) -> Result<OrderReceipt> {
        info!(
            token_id = %order.token_id,
            side = %order.side,
            price = %order.price,
            size = %order.size,
            "Dry run: order not submitted"
        );
        Ok(OrderReceipt {
            order_id: None,
            status: "dry_run".to_string(),
            raw: serde_json::to_value(order)?,
        })
    }
}
