//! # Connector Configuration
//!
//! Backend tier settings loaded from environment variables.

use super::{env_var_optional, env_var_or_default, env_var_or_default_str, ServiceInfo};
use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_AWS_TIMEOUT_SECS, DEFAULT_CONNECTOR_PORT,
    DEFAULT_PROBE_TIMEOUT_SECS,
};
use std::time::Duration;

/// Connector-level configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Service identity reported on `/version` and `/health`
    pub info: ServiceInfo,
    /// AWS region for S3 and Parameter Store clients
    pub aws_region: String,
    /// Optional endpoint override applied to both SDK clients
    /// Used for LocalStack and other AWS-compatible test endpoints
    pub aws_endpoint_url: Option<String>,
    /// Operation timeout for AWS SDK calls (seconds)
    pub aws_timeout_secs: u64,
    /// Timeout for the AWS connectivity probe (seconds)
    pub probe_timeout_secs: u64,
    /// Listen port
    pub port: u16,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            info: ServiceInfo::new("Connector"),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            aws_endpoint_url: None,
            aws_timeout_secs: DEFAULT_AWS_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            port: DEFAULT_CONNECTOR_PORT,
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            info: ServiceInfo::from_env("Connector"),
            aws_region: env_var_or_default_str("AWS_REGION", DEFAULT_AWS_REGION),
            aws_endpoint_url: env_var_optional("AWS_ENDPOINT_URL"),
            aws_timeout_secs: env_var_or_default("AWS_TIMEOUT_SECS", DEFAULT_AWS_TIMEOUT_SECS),
            probe_timeout_secs: env_var_or_default("PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS),
            port: env_var_or_default("PORT", DEFAULT_CONNECTOR_PORT),
        }
    }

    /// Get AWS operation timeout duration
    pub fn aws_timeout(&self) -> Duration {
        Duration::from_secs(self.aws_timeout_secs)
    }

    /// Get probe timeout duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
