//! HTTP-level tests for the connector tier
//!
//! Drive `server::connector::router` through axum-test with an in-memory
//! provider, so every route, error mapping and metric is exercised without AWS.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use cloud_resource_gateway::observability::CallOutcome;
use cloud_resource_gateway::provider::ProviderError;
use cloud_resource_gateway::server::connector::{router, ConnectorState};
use common::{connector_state, InMemoryProvider, CIPHERTEXT};
use serde_json::Value;
use std::sync::Arc;

fn server_with(provider: InMemoryProvider) -> (TestServer, Arc<InMemoryProvider>, Arc<ConnectorState>) {
    let provider = Arc::new(provider);
    let state = connector_state(provider.clone());
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, provider, state)
}

#[tokio::test]
async fn test_list_buckets_keeps_order_and_count() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server.get("/aws/s3/buckets").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["buckets"][0]["name"], "alpha");
    assert_eq!(body["buckets"][1]["name"], "beta");
    assert_eq!(body["buckets"][0]["creation_date"], "2024-01-15T10:30:00Z");
}

#[tokio::test]
async fn test_list_parameters_with_prefix() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server
        .get("/aws/parameters")
        .add_query_param("path_prefix", "/app")
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["path_prefix"], "/app");
    let names: Vec<&str> = body["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["/app/x", "/app/secret"]);
    assert_eq!(body["parameters"][1]["type"], "SecureString");
}

#[tokio::test]
async fn test_list_parameters_without_prefix_returns_everything() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let body: Value = server.get("/aws/parameters").await.json();
    assert_eq!(body["count"], 3);
    assert!(body["path_prefix"].is_null());
}

#[tokio::test]
async fn test_empty_prefix_means_no_filter() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let body: Value = server
        .get("/aws/parameters")
        .add_query_param("path_prefix", "")
        .await
        .json();
    assert_eq!(body["count"], 3);
    assert!(body["path_prefix"].is_null());
}

#[tokio::test]
async fn test_get_parameter_value() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/x")
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["name"], "/app/x");
    assert_eq!(body["value"], "hello");
    assert_eq!(body["type"], "String");
    assert_eq!(body["version"], 1);
    assert_eq!(
        body["arn"],
        "arn:aws:ssm:us-east-1:123456789012:parameter/app/x"
    );
}

#[tokio::test]
async fn test_secure_string_decrypts_by_default() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let body: Value = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/secret")
        .await
        .json();
    assert_eq!(body["value"], "s3cr3t");
}

#[tokio::test]
async fn test_secure_string_without_decrypt_returns_ciphertext() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let body: Value = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/secret")
        .add_query_param("decrypt", "false")
        .await
        .json();
    assert_eq!(body["value"], CIPHERTEXT);
}

#[tokio::test]
async fn test_decrypt_accepts_numeric_and_capitalised_forms() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/secret")
        .add_query_param("decrypt", "1")
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["value"], "s3cr3t");

    let response = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/secret")
        .add_query_param("decrypt", "False")
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["value"], CIPHERTEXT);
}

#[tokio::test]
async fn test_unknown_parameter_is_404() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/missing")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["detail"], "Parameter '/missing' not found");
}

#[tokio::test]
async fn test_missing_name_is_422_without_provider_call() {
    let (server, provider, _) = server_with(InMemoryProvider::new());

    let response = server.get("/aws/parameters/value").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["detail"].is_string());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_ill_typed_decrypt_is_422() {
    let (server, provider, _) = server_with(InMemoryProvider::new());

    let response = server
        .get("/aws/parameters/value")
        .add_query_param("name", "/app/x")
        .add_query_param("decrypt", "maybe")
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_provider_is_503() {
    let (server, _, _) = server_with(InMemoryProvider::new().failing(
        ProviderError::Unavailable("dispatch failure: connection refused".to_string()),
    ));

    let response = server.get("/aws/s3/buckets").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let detail = response.json::<Value>()["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("connection refused"));
}

#[tokio::test]
async fn test_rejected_call_keeps_provider_status_and_code() {
    let (server, _, _) = server_with(InMemoryProvider::new().failing(ProviderError::Rejected {
        code: "AccessDeniedException".to_string(),
        message: "not authorized to perform ssm:DescribeParameters".to_string(),
        status: Some(403),
    }));

    let response = server.get("/aws/parameters").await;
    response.assert_status(StatusCode::FORBIDDEN);

    let detail = response.json::<Value>()["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("AccessDeniedException"));
    assert!(detail.contains("ssm:DescribeParameters"));
}

#[tokio::test]
async fn test_rejected_call_without_status_is_502() {
    let (server, _, _) = server_with(InMemoryProvider::new().failing(ProviderError::Rejected {
        code: "ThrottlingException".to_string(),
        message: "Rate exceeded".to_string(),
        status: None,
    }));

    server
        .get("/aws/s3/buckets")
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_provider_timeout_is_504() {
    let (server, _, _) = server_with(
        InMemoryProvider::new().failing(ProviderError::Timeout("operation timeout".to_string())),
    );

    server
        .get("/aws/s3/buckets")
        .await
        .assert_status(StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_health_healthy() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["dependency_healthy"], true);
    assert_eq!(body["aws_region"], "us-east-1");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_provider_unreachable() {
    let (server, _, _) = server_with(InMemoryProvider::new().unreachable());

    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["dependency_healthy"], false);
}

#[tokio::test]
async fn test_version_and_root() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    let body: Value = server.get("/version").await.json();
    assert_eq!(body["service"], "Connector");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["aws_region"], "us-east-1");
    assert!(body["commit"].is_string());
    assert!(body["build_time"].is_string());

    let body: Value = server.get("/").await.json();
    assert_eq!(body["message"], "Welcome to Connector");
    assert_eq!(body["health"], "/health");
}

#[tokio::test]
async fn test_every_request_recorded_exactly_once() {
    let (server, _, state) = server_with(InMemoryProvider::new());

    server.get("/aws/s3/buckets").await;
    server
        .get("/aws/parameters/value")
        .add_query_param("name", "/missing")
        .await;
    server.get("/aws/parameters/value").await;
    server.get("/no/such/route").await;

    let metrics = &state.metrics;
    assert_eq!(metrics.request_count("GET", "/aws/s3/buckets", 200), 1);
    assert_eq!(metrics.request_count("GET", "/aws/parameters/value", 404), 1);
    assert_eq!(metrics.request_count("GET", "/aws/parameters/value", 422), 1);
    assert_eq!(metrics.request_count("GET", "/no/such/route", 404), 1);
    assert_eq!(metrics.duration_samples("GET", "/aws/parameters/value"), 2);

    assert_eq!(
        metrics.provider_call_count("ssm", "get_parameter", CallOutcome::Attempt),
        1
    );
    assert_eq!(
        metrics.provider_call_count("ssm", "get_parameter", CallOutcome::Error),
        1
    );
    assert_eq!(
        metrics.provider_call_count("s3", "list_buckets", CallOutcome::Success),
        1
    );
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_text_format() {
    let (server, _, _) = server_with(InMemoryProvider::new());

    server.get("/aws/s3/buckets").await;

    let response = server.get("/metrics").await;
    response.assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = response.text();
    assert!(text.contains("connector_requests_total"));
    assert!(text.contains("connector_request_duration_seconds"));
    assert!(text.contains("connector_provider_calls_total"));
}
