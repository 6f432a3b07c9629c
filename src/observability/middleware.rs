//! # HTTP Middleware
//!
//! Request instrumentation shared by both tiers, plus the gateway's static
//! version header.

use super::metrics::RequestMetrics;
use crate::constants::GATEWAY_VERSION_HEADER;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Time every request from acceptance to final response and record it once
///
/// Applied with `Router::layer`, so it also covers fallback (404) responses
/// and errors mapped by handlers.
pub async fn track_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    metrics.record(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

/// Attach the gateway's own version to every response
///
/// No dependency call happens here; the connector version is only fetched by
/// `/health` and `/version`.
pub async fn gateway_version_header(
    State(version): State<HeaderValue>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(GATEWAY_VERSION_HEADER, version);
    response
}
