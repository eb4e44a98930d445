//! Configuration and client tests.
//!
//! Tests actual behavior, not constants.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mydisease_mcp::client::MyDiseaseClient;
use mydisease_mcp::config::{Config, api};
use mydisease_mcp::dispatch::{BatchDispatcher, DispatchSettings};
use mydisease_mcp::error::{ClientError, TransportErrorKind};
use mydisease_mcp::models::Dimension;
use mydisease_mcp::query::UpstreamRequest;

// =============================================================================
// Config Behavior Tests
// =============================================================================

#[test]
fn test_config_default_points_at_public_api() {
    let config = Config::default();
    assert_eq!(config.base_url, "https://mydisease.info/v1");
    assert_eq!(config.id_batch_size, 1000);
    assert!(config.query_batch_size <= config.id_batch_size);
    assert!(config.concurrency_limit >= 1);
}

#[test]
fn test_config_for_testing_has_no_pauses() {
    let config = Config::for_testing("http://localhost:1234/");
    assert_eq!(config.base_url, "http://localhost:1234/v1");
    assert_eq!(config.rate_limit, 0);
    assert_eq!(config.retry_pause, Duration::ZERO);
}

#[test]
fn test_max_batch_size_per_dimension() {
    let config = Config::new();
    assert_eq!(config.max_batch_size(Dimension::Id), api::ID_BATCH_SIZE);
    for dimension in [Dimension::Gene, Dimension::Variant, Dimension::Phenotype, Dimension::Text] {
        assert_eq!(config.max_batch_size(dimension), api::QUERY_BATCH_SIZE);
    }
}

#[test]
fn test_dispatch_settings_follow_config() {
    let mut config = Config::for_testing("http://localhost:1");
    config.query_batch_size = 7;
    config.concurrency_limit = 2;

    let client = Arc::new(MyDiseaseClient::new(&config).unwrap());
    let dispatcher = BatchDispatcher::new(client, DispatchSettings::from(&config));

    assert_eq!(dispatcher.max_chunk_size(Dimension::Gene), 7);
    assert_eq!(dispatcher.max_chunk_size(Dimension::Id), config.id_batch_size);
    assert_eq!(dispatcher.settings().concurrency_limit, 2);
}

// =============================================================================
// Client Behavior Tests
// =============================================================================

#[test]
fn test_client_creation_succeeds() {
    let client = MyDiseaseClient::new(&Config::default());
    assert!(client.is_ok());
}

#[test]
fn test_client_reports_base_url() {
    let client = MyDiseaseClient::new(&Config::for_testing("http://localhost:1234")).unwrap();
    assert_eq!(client.base_url(), "http://localhost:1234/v1");
}

#[tokio::test]
async fn test_client_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/disease"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"ids": ["MONDO:0007739"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = MyDiseaseClient::new(&Config::for_testing(&server.uri())).unwrap();
    let body = client
        .execute(&UpstreamRequest::post("disease", json!({"ids": ["MONDO:0007739"]})))
        .await
        .unwrap();

    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_client_sends_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .and(query_param("q", "name:\"cystic fibrosis\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "hits": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = MyDiseaseClient::new(&Config::for_testing(&server.uri())).unwrap();
    let body = client
        .query(&[("q".to_string(), "name:\"cystic fibrosis\"".to_string())])
        .await
        .unwrap();

    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_client_encodes_disease_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/disease/MONDO:0007739%2Fx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = MyDiseaseClient::new(&Config::for_testing(&server.uri())).unwrap();
    assert!(client.get_disease("MONDO:0007739/x", None).await.is_ok());
}

async fn fetch_error(client: &MyDiseaseClient, route: &str) -> ClientError {
    client.execute(&UpstreamRequest::get(route, Vec::new())).await.unwrap_err()
}

#[tokio::test]
async fn test_client_status_mapping() {
    let server = MockServer::start().await;
    for (status, route) in [(400, "/v1/bad"), (404, "/v1/missing"), (429, "/v1/busy"), (503, "/v1/down")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;
    }

    let client = MyDiseaseClient::new(&Config::for_testing(&server.uri())).unwrap();
    let bad = fetch_error(&client, "bad").await;
    assert!(matches!(bad, ClientError::BadRequest { status: 400, .. }));
    assert!(!bad.is_retryable());

    let missing = fetch_error(&client, "missing").await;
    assert!(matches!(missing, ClientError::NotFound { .. }));
    assert!(!missing.is_retryable());

    let busy = fetch_error(&client, "busy").await;
    assert!(!busy.is_retryable());
    assert_eq!(busy.kind(), TransportErrorKind::Rejected);

    let down = fetch_error(&client, "down").await;
    assert!(down.is_retryable());
    assert_eq!(down.kind(), TransportErrorKind::Server);
}

#[tokio::test]
async fn test_client_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = MyDiseaseClient::new(&Config::for_testing(&server.uri())).unwrap();
    let err = client.metadata().await.unwrap_err();

    assert!(matches!(err, ClientError::Parse(_)));
    assert_eq!(err.kind(), TransportErrorKind::MalformedBody);
}

#[tokio::test]
async fn test_client_timeout_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/metadata"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = Config::for_testing(&server.uri());
    config.request_timeout = Duration::from_millis(200);
    let client = MyDiseaseClient::new(&config).unwrap();

    let err = client.metadata().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.kind(), TransportErrorKind::Timeout);
}
