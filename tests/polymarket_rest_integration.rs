//! Integration tests for the Polymarket REST client
//!
//! The Gamma, Data and CLOB endpoints are served by a local wiremock server,
//! so these run offline and check the exact requests the client makes.

mod common;

use common::{EVENTS_RESPONSE, POSITIONS_RESPONSE};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use polymarket_agent::common::errors::AgentError;
use polymarket_agent::common::traits::{EventFilter, MarketDataProvider};
use polymarket_agent::config::types::PolymarketConfig;
use polymarket_agent::strategy::{normalize_position, MarketNormalizer};
use polymarket_agent::{PolymarketClient, PolymarketRestClient};

/// One mock server standing in for all three APIs
fn client_for(server: &MockServer) -> PolymarketRestClient {
    let uri = server.uri();
    PolymarketRestClient::new(&uri, &uri, &uri).expect("Failed to create REST client")
}

// ============================================================================
// Gamma API
// ============================================================================

#[tokio::test]
async fn test_get_events_sends_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("closed", "false"))
        .and(query_param("active", "true"))
        .and(query_param("limit", "20"))
        .and(query_param("order", "id"))
        .and(query_param("ascending", "false"))
        .and(query_param("volume_min", "50000"))
        .and(query_param("tag_slug", "economy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EVENTS_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filter = EventFilter::new(Some("economy".to_string()), 20, 50_000);
    let events = client.get_events(&filter).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "16085");
    assert_eq!(events[0].liquidity.as_deref(), Some("1250000.5"));

    let candidates = MarketNormalizer::new(dec!(0.90)).candidates(&events);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].market_id, "516710");
    assert_eq!(candidates[0].quote("Yes").unwrap().price, dec!(0.62));
    assert_eq!(candidates[0].quote("No").unwrap().token_id, "222");
}

#[tokio::test]
async fn test_get_market_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets/516710"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 516710,
            "question": "Fed cuts rates by 25 bps?",
            "conditionId": "0xabc",
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["0.62", "0.38"],
            "clobTokenIds": ["111", "222"],
            "active": true,
            "closed": false
        })))
        .mount(&server)
        .await;

    let market = client_for(&server).get_market("516710").await.unwrap();
    assert_eq!(market.id, "516710");

    let snapshot = MarketNormalizer::new(dec!(0.90)).normalize(&market).unwrap();
    assert_eq!(snapshot.token_names(), vec!["Yes".to_string(), "No".to_string()]);
}

#[tokio::test]
async fn test_get_markets_by_condition() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("condition_ids", "0xabc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            common::gamma_market_json("516710", "0xabc", ["Yes", "No"], ["0.6", "0.4"], ["111", "222"])
        ])))
        .mount(&server)
        .await;

    let markets = client_for(&server).get_markets_by_condition("0xabc").await.unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].condition_id.as_deref(), Some("0xabc"));
}

// ============================================================================
// Data API
// ============================================================================

#[tokio::test]
async fn test_get_positions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .and(query_param("user", "0xfunder"))
        .respond_with(ResponseTemplate::new(200).set_body_string(POSITIONS_RESPONSE))
        .mount(&server)
        .await;

    let positions = client_for(&server).get_positions("0xfunder").await.unwrap();
    assert_eq!(positions.len(), 1);

    let held = normalize_position(&positions[0]).unwrap();
    assert_eq!(held.token_id, "111");
    assert_eq!(held.size, dec!(12.5));
    assert_eq!(held.current_price, dec!(0.6));
    assert_eq!(held.delta, dec!(2.5));
    assert_eq!(held.delta_rate(), Some(dec!(0.5)));
}

// ============================================================================
// CLOB API
// ============================================================================

#[tokio::test]
async fn test_get_price_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices-history"))
        .and(query_param("market", "111"))
        .and(query_param("interval", "1w"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [
                {"t": 1760000000, "p": 0.41},
                {"t": 1760086400, "p": 0.47}
            ]
        })))
        .mount(&server)
        .await;

    let points = client_for(&server).get_price_history("111", "1w").await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].timestamp.timestamp(), 1760000000);
    assert_eq!(points[1].price, dec!(0.47));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"OK\""))
        .mount(&server)
        .await;

    assert!(client_for(&server).get_ok().await.unwrap());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_positions("0xfunder").await.unwrap_err();
    assert!(matches!(err, AgentError::UpstreamUnavailable(ref msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_invalid_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_market("1").await.unwrap_err();
    assert_eq!(err.kind(), "JsonParse");
}

#[tokio::test]
async fn test_unreachable_host_is_upstream_unavailable() {
    // nothing listens on the discard port
    let client = PolymarketRestClient::new(
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    )
    .unwrap();
    let err = client.get_events(&EventFilter::new(None, 5, 0)).await.unwrap_err();
    assert_eq!(err.kind(), "UpstreamUnavailable");
}

// ============================================================================
// Provider seam
// ============================================================================

#[tokio::test]
async fn test_client_serves_provider_trait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(POSITIONS_RESPONSE))
        .mount(&server)
        .await;

    let config = PolymarketConfig {
        rest_url: server.uri(),
        gamma_url: server.uri(),
        data_url: server.uri(),
        funder: Some("0xfunder".to_string()),
        ..PolymarketConfig::default()
    };
    let client = PolymarketClient::new(config, std::time::Duration::from_secs(5)).unwrap();

    assert_eq!(client.account().unwrap(), "0xfunder");
    let positions = client.fetch_positions("0xfunder").await.unwrap();
    assert_eq!(positions[0].condition_id, "0xabc");
}
