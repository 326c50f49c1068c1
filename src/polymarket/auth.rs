//! L2 (HMAC) authentication for Polymarket CLOB requests

use base64::{engine::general_purpose::URL_SAFE as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{AgentError, Result};
use crate::config::types::ApiCredentials;

type HmacSha256 = Hmac<Sha256>;

/// Generate HMAC-SHA256 signature for API requests
///
/// # Arguments
/// * `secret` - API secret key (url-safe base64 encoded)
/// * `timestamp` - Unix timestamp in seconds
/// * `method` - HTTP method (GET, POST, etc.)
/// * `request_path` - API endpoint path
/// * `body` - Request body (empty string for GET requests)
pub fn sign_request(
    secret: &str,
    timestamp: i64,
    method: &str,
    request_path: &str,
    body: &str,
) -> Result<String> {
    let secret_bytes = BASE64
        .decode(secret)
        .map_err(|e| AgentError::Authentication(format!("Failed to decode secret: {}", e)))?;

    // timestamp + method + path + body
    let message = format!("{}{}{}{}", timestamp, method.to_uppercase(), request_path, body);

    let mut mac = HmacSha256::new_from_slice(&secret_bytes)
        .map_err(|e| AgentError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(message.as_bytes());
    let result = mac.finalize();

    Ok(BASE64.encode(result.into_bytes()))
}

/// Generate authentication headers for a request made on behalf of `address`
pub fn generate_auth_headers(
    address: &str,
    credentials: &ApiCredentials,
    method: &str,
    request_path: &str,
    body: &str,
) -> Result<AuthHeaders> {
    let timestamp = chrono::Utc::now().timestamp();
    let signature = sign_request(
        &credentials.api_secret,
        timestamp,
        method,
        request_path,
        body,
    )?;

    Ok(AuthHeaders {
        address: address.to_string(),
        api_key: credentials.api_key.clone(),
        signature,
        timestamp,
        passphrase: credentials.passphrase.clone(),
    })
}

/// Authentication headers for API requests
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    pub address: String,
    pub api_key: String,
    pub signature: String,
    pub timestamp: i64,
    pub passphrase: String,
}

impl AuthHeaders {
    /// Add authentication headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("POLY_ADDRESS", &self.address)
            .header("POLY_API_KEY", &self.api_key)
            .header("POLY_SIGNATURE", &self.signature)
            .header("POLY_TIMESTAMP", self.timestamp.to_string())
            .header("POLY_PASSPHRASE", &self.passphrase)
    }
}
