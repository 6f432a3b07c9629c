//! # HTTP Server
//!
//! axum routers for both tiers and the plumbing they share.
//!
//! - `connector`: backend tier serving `/aws/...` from a [`ResourceProvider`](crate::provider::ResourceProvider)
//! - `gateway`: front tier forwarding `<API_PREFIX>/...` to the connector
//!
//! Both tiers expose:
//! - `/` - Welcome message
//! - `/health` - Dependency health (200 healthy, 503 degraded)
//! - `/version` - Service identity and build stamp
//! - `/metrics` - Prometheus metrics in text format

pub mod connector;
pub mod gateway;

use crate::config::ServiceInfo;
use crate::error::ApiError;
use crate::observability::RequestMetrics;
use axum::{
    extract::rejection::QueryRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{de, Deserialize, Deserializer};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Query of the parameter listing routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParametersQuery {
    pub path_prefix: Option<String>,
}

impl ListParametersQuery {
    /// Prefix to filter by; an empty value means "no filter"
    pub fn prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref().filter(|p| !p.is_empty())
    }
}

/// Query of the parameter value routes
#[derive(Debug, Clone, Deserialize)]
pub struct GetParameterQuery {
    pub name: String,
    #[serde(default = "default_decrypt", deserialize_with = "deserialize_flag")]
    pub decrypt: bool,
}

fn default_decrypt() -> bool {
    true
}

/// Parse a boolean query flag
///
/// Case-insensitive `true/false`, `t/f`, `yes/no`, `y/n`, `on/off` and `1/0`;
/// anything else is `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| {
        de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a boolean (true/false, yes/no, on/off, 1/0)",
        )
    })
}

impl GetParameterQuery {
    /// Reject an empty `name` the same way a missing one is rejected
    #[allow(
        clippy::missing_errors_doc,
        reason = "Only fails with ApiError::Validation"
    )]
    pub fn validate(self) -> Result<Self, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation(
                "Query parameter 'name' must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Map an axum query rejection (missing or ill-typed argument) to 422
pub fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

/// Body of `GET /`
pub fn welcome(info: &ServiceInfo) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {}", info.service),
        "version": info.version,
        "health": "/health",
    }))
}

/// Body of `GET /metrics` in the Prometheus text exposition format
pub fn metrics_response(metrics: &RequestMetrics) -> Response {
    match metrics.snapshot() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}

/// Serve `router` on `0.0.0.0:port` until SIGINT/SIGTERM
#[allow(
    clippy::missing_errors_doc,
    reason = "Fails when the port cannot be bound or the server stops with an I/O error"
)]
pub async fn serve(port: u16, router: Router) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Received shutdown signal, draining in-flight requests...");
}
