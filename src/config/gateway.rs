//! # Gateway Configuration
//!
//! Front tier settings loaded from environment variables.

use super::{env_var_or_default, env_var_or_default_str, ServiceInfo};
use crate::constants::{
    DEFAULT_API_PREFIX, DEFAULT_CONNECTOR_URL, DEFAULT_FORWARD_TIMEOUT_SECS, DEFAULT_GATEWAY_PORT,
    DEFAULT_PROBE_TIMEOUT_SECS,
};
use std::time::Duration;

/// Gateway-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Service identity reported on `/version` and `/health`
    pub info: ServiceInfo,
    /// Base URL of the backend connector (no trailing slash)
    pub connector_url: String,
    /// Per-call timeout for forwarded requests (seconds)
    pub connector_timeout_secs: u64,
    /// Timeout for the connector health probe and version side-call (seconds)
    pub probe_timeout_secs: u64,
    /// Prefix of the forwarded resource routes ("" mounts them at the root)
    pub api_prefix: String,
    /// Listen port
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            info: ServiceInfo::new("Gateway"),
            connector_url: DEFAULT_CONNECTOR_URL.to_string(),
            connector_timeout_secs: DEFAULT_FORWARD_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            port: DEFAULT_GATEWAY_PORT,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            info: ServiceInfo::from_env("Gateway"),
            connector_url: normalize_base_url(&env_var_or_default_str(
                "CONNECTOR_URL",
                DEFAULT_CONNECTOR_URL,
            )),
            connector_timeout_secs: env_var_or_default(
                "CONNECTOR_TIMEOUT_SECS",
                DEFAULT_FORWARD_TIMEOUT_SECS,
            ),
            probe_timeout_secs: env_var_or_default("PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS),
            api_prefix: normalize_api_prefix(&env_var_or_default_str(
                "API_PREFIX",
                DEFAULT_API_PREFIX,
            )),
            port: env_var_or_default("PORT", DEFAULT_GATEWAY_PORT),
        }
    }

    /// Get forwarding timeout duration
    pub fn connector_timeout(&self) -> Duration {
        Duration::from_secs(self.connector_timeout_secs)
    }

    /// Get probe timeout duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Strip trailing slashes so endpoints can be appended verbatim
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Ensure a leading slash and no trailing slash; "/" and "" both mean "no prefix"
pub fn normalize_api_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
