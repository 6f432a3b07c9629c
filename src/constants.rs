//! # Constants
//!
//! Shared constants used by both tiers.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see [`crate::config`]).

/// Default listen port for the gateway tier
pub const DEFAULT_GATEWAY_PORT: u16 = 8000;

/// Default listen port for the connector tier
pub const DEFAULT_CONNECTOR_PORT: u16 = 8001;

/// Default connector base URL as seen from the gateway
pub const DEFAULT_CONNECTOR_URL: &str = "http://connector:8001";

/// Default per-call timeout for gateway -> connector forwarding (seconds)
pub const DEFAULT_FORWARD_TIMEOUT_SECS: u64 = 30;

/// Default per-call timeout for connector -> AWS operations (seconds)
pub const DEFAULT_AWS_TIMEOUT_SECS: u64 = 30;

/// Default timeout for health probes and version side-calls (seconds)
/// Independent of the forwarding timeout so a slow dependency cannot stall `/health`
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default prefix of the forwarded resource routes on the gateway
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default AWS region for the connector
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Default environment label
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Metric namespace of the gateway tier
pub const GATEWAY_METRICS_NAMESPACE: &str = "gateway";

/// Metric namespace of the connector tier
pub const CONNECTOR_METRICS_NAMESPACE: &str = "connector";

/// Response header carrying the gateway's own version
pub const GATEWAY_VERSION_HEADER: &str = "x-gateway-version";

/// Reported when a dependency's version cannot be fetched
pub const UNKNOWN_VERSION: &str = "unknown";

/// Git commit the binary was built from (stamped by `build.rs`)
pub const BUILD_GIT_HASH: &str = env!("BUILD_GIT_HASH");

/// Build time of the binary in RFC 3339 (stamped by `build.rs`)
pub const BUILD_DATETIME: &str = env!("BUILD_DATETIME");
