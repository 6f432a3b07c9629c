//! Common test utilities for the HTTP-level tests
//!
//! Provides an in-memory [`ResourceProvider`], router/state builders for both
//! tiers, and a loopback listener for end-to-end gateway -> connector runs.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cloud_resource_gateway::config::{ConnectorConfig, GatewayConfig};
use cloud_resource_gateway::forwarder::Forwarder;
use cloud_resource_gateway::observability::RequestMetrics;
use cloud_resource_gateway::provider::{
    BucketListing, BucketSummary, ParameterListing, ParameterSummary, ParameterType,
    ParameterValue, ProviderError, ResourceProvider,
};
use cloud_resource_gateway::server::{connector::ConnectorState, gateway::GatewayState};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

static RUSTLS_INIT: Once = Once::new();

/// Ciphertext returned for secret parameters when decryption is not requested
pub const CIPHERTEXT: &str = "AQICAHh0ZXN0LWtleQ==";

/// Initialize rustls crypto provider for tests
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Ignore the error: another test in the same binary may have installed it
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Provider backed by fixed data
///
/// Resource operations are counted so tests can assert that validation
/// failures never reach the provider. The health probe is not counted.
pub struct InMemoryProvider {
    buckets: Vec<BucketSummary>,
    parameters: Vec<ParameterValue>,
    failure: Option<ProviderError>,
    reachable: bool,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    /// Two buckets and three parameters (one secret) under `/app` and `/other`
    pub fn new() -> Self {
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        Self {
            buckets: vec![
                BucketSummary {
                    name: "alpha".to_string(),
                    creation_date: Some(created),
                },
                BucketSummary {
                    name: "beta".to_string(),
                    creation_date: Some(created),
                },
            ],
            parameters: vec![
                parameter("/app/x", "hello", ParameterType::String),
                parameter("/app/secret", "s3cr3t", ParameterType::SecureString),
                parameter("/other/y", "a,b", ParameterType::StringList),
            ],
            failure: None,
            reachable: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every resource operation fails with `error`
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// The health probe fails
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Resource operations served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn parameter(name: &str, value: &str, parameter_type: ParameterType) -> ParameterValue {
    ParameterValue {
        name: name.to_string(),
        value: value.to_string(),
        parameter_type,
        version: 1,
        last_modified: Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()),
        arn: format!("arn:aws:ssm:us-east-1:123456789012:parameter{name}"),
    }
}

#[async_trait]
impl ResourceProvider for InMemoryProvider {
    async fn list_buckets(&self) -> Result<BucketListing, ProviderError> {
        self.begin()?;
        Ok(BucketListing::new(self.buckets.clone()))
    }

    async fn list_parameters(
        &self,
        path_prefix: Option<&str>,
    ) -> Result<ParameterListing, ProviderError> {
        self.begin()?;
        let parameters = self
            .parameters
            .iter()
            .filter(|p| path_prefix.is_none_or(|prefix| p.name.starts_with(prefix)))
            .map(|p| ParameterSummary {
                name: p.name.clone(),
                parameter_type: p.parameter_type,
                last_modified: p.last_modified,
                version: p.version,
            })
            .collect();
        Ok(ParameterListing::new(
            parameters,
            path_prefix.map(str::to_string),
        ))
    }

    async fn get_parameter(
        &self,
        name: &str,
        decrypt: bool,
    ) -> Result<ParameterValue, ProviderError> {
        self.begin()?;
        let mut found = self
            .parameters
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                name: name.to_string(),
            })?;
        if found.parameter_type.is_secret() && !decrypt {
            found.value = CIPHERTEXT.to_string();
        }
        Ok(found)
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        if self.reachable {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(
                "dispatch failure: connection refused".to_string(),
            ))
        }
    }
}

/// Connector state around `provider` with a fresh metrics registry
pub fn connector_state(provider: Arc<InMemoryProvider>) -> Arc<ConnectorState> {
    let metrics = Arc::new(RequestMetrics::new("connector").unwrap());
    Arc::new(ConnectorState::new(
        provider,
        &ConnectorConfig::default(),
        metrics,
    ))
}

/// Gateway state forwarding to `connector_url` with the default timeouts
pub fn gateway_state(connector_url: &str) -> Arc<GatewayState> {
    init_rustls();
    let config = GatewayConfig {
        connector_url: connector_url.to_string(),
        probe_timeout_secs: 1,
        ..GatewayConfig::default()
    };
    let metrics = Arc::new(RequestMetrics::new("gateway").unwrap());
    Arc::new(GatewayState::new(&config, metrics).unwrap())
}

/// Gateway state whose forwarding timeout is `timeout` (sub-second timeouts for slow-path tests)
pub fn gateway_state_with_timeout(connector_url: &str, timeout: Duration) -> Arc<GatewayState> {
    init_rustls();
    let config = GatewayConfig {
        connector_url: connector_url.to_string(),
        probe_timeout_secs: 1,
        ..GatewayConfig::default()
    };
    let forwarder = Forwarder::new(connector_url, timeout, config.info.version.as_str()).unwrap();
    let metrics = Arc::new(RequestMetrics::new("gateway").unwrap());
    Arc::new(GatewayState::with_forwarder(forwarder, &config, metrics))
}

/// Serve `router` on an ephemeral loopback port for the rest of the test
pub async fn spawn(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
