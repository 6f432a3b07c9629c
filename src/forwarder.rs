//! # Gateway Forwarder
//!
//! Forwards gateway requests to the backend connector over HTTP.
//!
//! One `reqwest::Client` (and therefore one connection pool) is created at
//! startup and shared by every in-flight request. Each call is bounded by the
//! client's timeout; failures are classified by [`ApiError`] before they leave
//! this module. Nothing is retried here: all forwarded operations are
//! idempotent GETs and callers may re-issue them.

use crate::error::ApiError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info};

/// Field added to every forwarded payload
pub const GATEWAY_VERSION_FIELD: &str = "gateway_version";

#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: String,
    version: String,
}

impl Forwarder {
    /// Build a forwarder with its own pooled client
    #[allow(
        clippy::missing_errors_doc,
        reason = "Fails only if the TLS backend cannot be initialised"
    )]
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        version: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, version))
    }

    /// Build a forwarder around an existing client
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared client, reused by health and version side-calls
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET `base_url + endpoint` with `query` and return the decoded JSON body
    /// with [`GATEWAY_VERSION_FIELD`] added
    ///
    /// # Errors
    ///
    /// - [`ApiError::Timeout`] when the connector exceeds the client timeout
    /// - [`ApiError::Upstream`] when the connector answers non-2xx (status and body kept)
    /// - [`ApiError::Unreachable`] on connection failures
    /// - [`ApiError::Internal`] for anything else, including a non-object body
    pub async fn forward(
        &self,
        endpoint: &str,
        query: &BTreeMap<String, String>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        info!("Calling connector: {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let mapped = ApiError::from_forward_error(&e);
                error!("Connector call to {} failed: {}", url, mapped);
                mapped
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            error!(
                "HTTP error from connector: {} - {}",
                status.as_u16(),
                body
            );
            return Err(ApiError::upstream(status.as_u16(), &body));
        }

        let body: Value = response.json().await.map_err(|e| {
            let mapped = ApiError::from_forward_error(&e);
            error!("Invalid response from connector {}: {}", url, mapped);
            mapped
        })?;

        self.attach_version(body)
    }

    /// Add the gateway version without shadowing a connector-provided field of the same name
    fn attach_version(&self, body: Value) -> Result<Value, ApiError> {
        match body {
            Value::Object(mut map) => {
                map.entry(GATEWAY_VERSION_FIELD)
                    .or_insert_with(|| Value::String(self.version.clone()));
                Ok(Value::Object(map))
            }
            other => Err(ApiError::Internal(format!(
                "Internal error: expected a JSON object from connector, got {other}"
            ))),
        }
    }
}

/// Body text of an error response, or the reason it could not be read
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}
