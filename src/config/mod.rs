//! # Configuration
//!
//! Tier-level settings loaded from environment variables.
//!
//! - `gateway`: front tier (connector URL, forwarding timeout, route prefix)
//! - `connector`: backend tier (AWS region, endpoint override, SDK timeout)

pub mod connector;
pub mod gateway;

pub use connector::ConnectorConfig;
pub use gateway::GatewayConfig;

use crate::constants::DEFAULT_ENVIRONMENT;

/// Identity a service reports on `/`, `/health` and `/version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Human-readable service name (e.g. "Gateway")
    pub service: String,
    /// Semantic version string
    pub version: String,
    /// Environment label (development, staging, production, ...)
    pub environment: String,
}

impl ServiceInfo {
    /// Build service identity with the crate version and default environment
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }

    /// Load service identity from `APP_NAME`, `APP_VERSION` and `ENVIRONMENT`
    pub fn from_env(default_service: &str) -> Self {
        Self {
            service: env_var_or_default_str("APP_NAME", default_service),
            version: env_var_or_default_str("APP_VERSION", env!("CARGO_PKG_VERSION")),
            environment: env_var_or_default_str("ENVIRONMENT", DEFAULT_ENVIRONMENT),
        }
    }
}

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
pub(crate) fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read optional environment variable, treating an empty value as unset
pub(crate) fn env_var_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
