//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry_config(base_url: String, retries: u32) -> HttpClientConfig {
    HttpClientConfig::builder()
        .base_url(base_url)
        .max_retries(retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_none());
    assert!(config.user_agent.starts_with("feedpoll/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://rpc.example.org")
        .timeout(Duration::from_secs(5))
        .max_retries(1)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(2),
        )
        .rate_limit(RateLimiterConfig::new(2, 2))
        .header("X-Client", "feedpoll")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url.as_deref(), Some("https://rpc.example.org"));
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(2, 2)));
    assert_eq!(
        config.default_headers.get("X-Client"),
        Some(&"feedpoll".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_http_client_rejects_bad_rate_limit() {
    let config = HttpClientConfig::builder()
        .rate_limit(RateLimiterConfig::new(0, 1))
        .build();

    let err = HttpClient::with_config(config).unwrap_err();
    assert!(err.is_config());
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_post_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Client", "feedpoll"))
        .and(body_partial_json(json!({"method": "query"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 42})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .header("X-Client", "feedpoll")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let value: serde_json::Value = client
        .post_json(&mock_server.uri(), json!({"method": "query"}))
        .await
        .unwrap();
    assert_eq!(value["result"], 42);
}

#[tokio::test]
async fn test_http_client_relative_path_joins_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/v1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = format!("{}/rpc", mock_server.uri());
    let client = HttpClient::with_config(fast_retry_config(base, 0)).unwrap();
    let response = client.post("/v1", &json!({})).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_bad_base_url() {
    let client =
        HttpClient::with_config(fast_retry_config("not a url".to_string(), 0)).unwrap();
    let err = client.post("v1", &json!({})).await.unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[tokio::test]
async fn test_http_client_404_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such node"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_retry_config(mock_server.uri(), 3)).unwrap();
    let err = client.post("/", &json!({})).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "no such node"));
}

#[tokio::test]
async fn test_http_client_retry_on_503() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_retry_config(mock_server.uri(), 3)).unwrap();
    let response = client.post("/", &json!({})).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_retry_config(mock_server.uri(), 2)).unwrap();
    let err = client.post("/", &json!({})).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_client_rate_limited_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_retry_config(mock_server.uri(), 1)).unwrap();
    let err = client.post("/", &json!({})).await.unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

// ============================================================================
// Backoff Tests
// ============================================================================

fn client_with_backoff(backoff_type: BackoffType) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(
            backoff_type,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_calculate_backoff_constant() {
    let client = client_with_backoff(BackoffType::Constant);
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let client = client_with_backoff(BackoffType::Linear);
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential_capped() {
    let client = client_with_backoff(BackoffType::Exponential);
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(40), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::new().unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("HttpClient"));
    assert!(debug.contains("has_rate_limiter: false"));
}
