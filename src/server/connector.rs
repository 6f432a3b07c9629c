//! # Connector Server
//!
//! Backend tier: answers `/aws/...` routes from a [`ResourceProvider`].
//!
//! Every provider call is counted in `connector_provider_calls_total` and
//! every failure leaves the handler already classified as an [`ApiError`].

use super::{
    metrics_response, query_rejection, serve, welcome, GetParameterQuery, ListParametersQuery,
};
use crate::config::{ConnectorConfig, ServiceInfo};
use crate::constants::{BUILD_DATETIME, BUILD_GIT_HASH, CONNECTOR_METRICS_NAMESPACE};
use crate::error::ApiError;
use crate::health::{DependencyProbe, HealthAggregator, ProviderProbe};
use crate::observability::{middleware::track_requests, RequestMetrics};
use crate::provider::aws::AwsResourceProvider;
use crate::provider::{BucketListing, ParameterListing, ParameterValue, ResourceProvider};
use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Name of the provider dependency in health reports
const PROVIDER_DEPENDENCY: &str = "aws";

pub struct ConnectorState {
    pub provider: Arc<dyn ResourceProvider>,
    pub health: Arc<HealthAggregator>,
    pub metrics: Arc<RequestMetrics>,
    pub info: ServiceInfo,
    pub aws_region: String,
}

impl std::fmt::Debug for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorState")
            .field("info", &self.info)
            .field("aws_region", &self.aws_region)
            .finish_non_exhaustive()
    }
}

impl ConnectorState {
    /// Wire the provider into a health aggregator bounded by the probe timeout
    pub fn new(
        provider: Arc<dyn ResourceProvider>,
        config: &ConnectorConfig,
        metrics: Arc<RequestMetrics>,
    ) -> Self {
        let probe: Arc<dyn DependencyProbe> =
            Arc::new(ProviderProbe::new(PROVIDER_DEPENDENCY, provider.clone()));

        Self {
            health: Arc::new(HealthAggregator::new(vec![probe], config.probe_timeout())),
            provider,
            metrics,
            info: config.info.clone(),
            aws_region: config.aws_region.clone(),
        }
    }
}

pub fn router(state: Arc<ConnectorState>) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/metrics", get(metrics_handler))
        .route("/aws/s3/buckets", get(list_buckets))
        .route("/aws/parameters", get(list_parameters))
        .route("/aws/parameters/value", get(get_parameter))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(metrics, track_requests)),
        )
        .with_state(state)
}

/// Run the connector tier until shutdown
#[allow(
    clippy::missing_errors_doc,
    reason = "Startup failures are reported to main as anyhow errors"
)]
pub async fn run(config: ConnectorConfig) -> anyhow::Result<()> {
    info!(
        "Starting {} v{} (environment: {}, AWS region: {})",
        config.info.service, config.info.version, config.info.environment, config.aws_region
    );

    let metrics = Arc::new(
        RequestMetrics::new(CONNECTOR_METRICS_NAMESPACE)
            .context("Failed to register connector metrics")?,
    );
    let provider: Arc<dyn ResourceProvider> = Arc::new(AwsResourceProvider::new(&config).await);
    let state = Arc::new(ConnectorState::new(provider, &config, metrics));

    serve(config.port, router(state)).await?;

    info!("Shutting down {}", config.info.service);
    Ok(())
}

async fn root(State(state): State<Arc<ConnectorState>>) -> Json<Value> {
    welcome(&state.info)
}

async fn health(State(state): State<Arc<ConnectorState>>) -> (StatusCode, Json<Value>) {
    let report = state.health.check().await;
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
            "aws_region": state.aws_region,
            "dependency_healthy": report.is_healthy(),
            "timestamp": report.timestamp,
        })),
    )
}

async fn version(State(state): State<Arc<ConnectorState>>) -> Json<Value> {
    Json(json!({
        "service": state.info.service,
        "version": state.info.version,
        "environment": state.info.environment,
        "aws_region": state.aws_region,
        "commit": BUILD_GIT_HASH,
        "build_time": BUILD_DATETIME,
    }))
}

async fn metrics_handler(State(state): State<Arc<ConnectorState>>) -> Response {
    metrics_response(&state.metrics)
}

async fn list_buckets(
    State(state): State<Arc<ConnectorState>>,
) -> Result<Json<BucketListing>, ApiError> {
    let listing = state
        .metrics
        .observe_provider_call("s3", "list_buckets", state.provider.list_buckets())
        .await?;
    Ok(Json(listing))
}

async fn list_parameters(
    State(state): State<Arc<ConnectorState>>,
    query: Result<Query<ListParametersQuery>, QueryRejection>,
) -> Result<Json<ParameterListing>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let listing = state
        .metrics
        .observe_provider_call(
            "ssm",
            "describe_parameters",
            state.provider.list_parameters(query.prefix()),
        )
        .await?;
    Ok(Json(listing))
}

async fn get_parameter(
    State(state): State<Arc<ConnectorState>>,
    query: Result<Query<GetParameterQuery>, QueryRejection>,
) -> Result<Json<ParameterValue>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let query = query.validate()?;
    let value = state
        .metrics
        .observe_provider_call(
            "ssm",
            "get_parameter",
            state.provider.get_parameter(&query.name, query.decrypt),
        )
        .await?;
    Ok(Json(value))
}

async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Not Found".to_string())
}
