//! # Gateway Server
//!
//! Front tier: forwards `<API_PREFIX>/...` routes to the connector and
//! annotates each payload with `gateway_version`.
//!
//! Query validation happens here, so a malformed request is answered with 422
//! without a connector round trip. The connector's version is fetched only by
//! `/health` and `/version`, through a side-call bounded by the probe timeout.

use super::{
    metrics_response, query_rejection, serve, welcome, GetParameterQuery, ListParametersQuery,
};
use crate::config::{gateway::normalize_api_prefix, GatewayConfig, ServiceInfo};
use crate::constants::{
    BUILD_DATETIME, BUILD_GIT_HASH, GATEWAY_METRICS_NAMESPACE, UNKNOWN_VERSION,
};
use crate::error::ApiError;
use crate::forwarder::Forwarder;
use crate::health::{fetch_dependency_version, DependencyProbe, HealthAggregator, HttpProbe};
use crate::observability::{
    middleware::{gateway_version_header, track_requests},
    RequestMetrics,
};
use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Name of the connector dependency in health reports
const CONNECTOR_DEPENDENCY: &str = "connector";

pub struct GatewayState {
    pub forwarder: Arc<Forwarder>,
    pub health: Arc<HealthAggregator>,
    pub metrics: Arc<RequestMetrics>,
    pub info: ServiceInfo,
    pub api_prefix: String,
    pub probe_timeout: Duration,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("info", &self.info)
            .field("connector_url", &self.forwarder.base_url())
            .field("api_prefix", &self.api_prefix)
            .finish_non_exhaustive()
    }
}

impl GatewayState {
    /// Build the shared connector client and the health probe that reuses it
    #[allow(
        clippy::missing_errors_doc,
        reason = "Fails only if the HTTP client cannot be built"
    )]
    pub fn new(config: &GatewayConfig, metrics: Arc<RequestMetrics>) -> Result<Self, reqwest::Error> {
        let forwarder = Forwarder::new(
            config.connector_url.as_str(),
            config.connector_timeout(),
            config.info.version.as_str(),
        )?;
        Ok(Self::with_forwarder(forwarder, config, metrics))
    }

    /// Wire an existing forwarder (and its client) into the gateway state
    pub fn with_forwarder(
        forwarder: Forwarder,
        config: &GatewayConfig,
        metrics: Arc<RequestMetrics>,
    ) -> Self {
        let probe: Arc<dyn DependencyProbe> = Arc::new(HttpProbe::new(
            CONNECTOR_DEPENDENCY,
            forwarder.client().clone(),
            format!("{}/health", forwarder.base_url()),
            config.probe_timeout(),
        ));

        Self {
            forwarder: Arc::new(forwarder),
            health: Arc::new(HealthAggregator::new(vec![probe], config.probe_timeout())),
            metrics,
            info: config.info.clone(),
            api_prefix: normalize_api_prefix(&config.api_prefix),
            probe_timeout: config.probe_timeout(),
        }
    }

    async fn dependency_version(&self) -> String {
        fetch_dependency_version(
            self.forwarder.client(),
            self.forwarder.base_url(),
            self.probe_timeout,
        )
        .await
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    let metrics = state.metrics.clone();
    let version = HeaderValue::from_str(&state.info.version).unwrap_or_else(|_| {
        warn!(
            "Version {:?} is not a valid header value, sending {:?}",
            state.info.version, UNKNOWN_VERSION
        );
        HeaderValue::from_static(UNKNOWN_VERSION)
    });

    let resources = Router::new()
        .route("/s3/buckets", get(list_buckets))
        .route("/parameters", get(list_parameters))
        .route("/parameters/value", get(get_parameter));

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(version_handler))
        .route("/metrics", get(metrics_handler));

    let router = if state.api_prefix.is_empty() {
        router.merge(resources)
    } else {
        router.nest(&state.api_prefix, resources)
    };

    router
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(metrics, track_requests))
                .layer(middleware::from_fn_with_state(version, gateway_version_header))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Run the gateway tier until shutdown
#[allow(
    clippy::missing_errors_doc,
    reason = "Startup failures are reported to main as anyhow errors"
)]
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    info!(
        "Starting {} v{} (environment: {}, connector: {})",
        config.info.service, config.info.version, config.info.environment, config.connector_url
    );

    let metrics = Arc::new(
        RequestMetrics::new(GATEWAY_METRICS_NAMESPACE)
            .context("Failed to register gateway metrics")?,
    );
    let state = Arc::new(
        GatewayState::new(&config, metrics).context("Failed to build connector HTTP client")?,
    );

    serve(config.port, router(state)).await?;

    info!("Shutting down {}", config.info.service);
    Ok(())
}

async fn root(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    welcome(&state.info)
}

async fn health(State(state): State<Arc<GatewayState>>) -> (StatusCode, Json<Value>) {
    let (report, dependency_version) =
        tokio::join!(state.health.check(), state.dependency_version());
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": report.status,
            "version": state.info.version,
            "dependency_version": dependency_version,
            "dependency_healthy": report.is_healthy(),
            "timestamp": report.timestamp,
        })),
    )
}

async fn version_handler(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    Json(json!({
        "service": state.info.service,
        "version": state.info.version,
        "environment": state.info.environment,
        "commit": BUILD_GIT_HASH,
        "build_time": BUILD_DATETIME,
        "dependency_version": state.dependency_version().await,
    }))
}

async fn metrics_handler(State(state): State<Arc<GatewayState>>) -> Response {
    metrics_response(&state.metrics)
}

async fn list_buckets(State(state): State<Arc<GatewayState>>) -> Result<Json<Value>, ApiError> {
    let body = state
        .forwarder
        .forward("/aws/s3/buckets", &BTreeMap::new())
        .await?;
    Ok(Json(body))
}

async fn list_parameters(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<ListParametersQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;

    let mut params = BTreeMap::new();
    if let Some(prefix) = query.prefix() {
        params.insert("path_prefix".to_string(), prefix.to_string());
    }

    let body = state.forwarder.forward("/aws/parameters", &params).await?;
    Ok(Json(body))
}

async fn get_parameter(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<GetParameterQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let query = query.validate()?;

    let params = BTreeMap::from([
        ("name".to_string(), query.name),
        ("decrypt".to_string(), query.decrypt.to_string()),
    ]);

    let body = state
        .forwarder
        .forward("/aws/parameters/value", &params)
        .await?;
    Ok(Json(body))
}

async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Not Found".to_string())
}
