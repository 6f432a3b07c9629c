//! # Health Aggregation
//!
//! On-demand reachability checks against a tier's dependencies, folded into a
//! composite status:
//!
//! - connector tier: the AWS provider's minimal listing call ([`ProviderProbe`])
//! - gateway tier: the connector's `/health` endpoint ([`HttpProbe`])
//!
//! Every probe runs under the aggregator's short timeout, independent of the
//! forwarding timeout. A probe that errors, times out, or answers non-2xx
//! counts as unreachable; the failure is logged and never surfaced as a
//! request error. Nothing is cached: each call re-probes.

use crate::constants::UNKNOWN_VERSION;
use crate::provider::ResourceProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A single dependency reachability check
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Dependency name used in reports and logs
    fn name(&self) -> &str;

    /// Succeeds when the dependency answered positively
    async fn probe(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Result of one health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub dependencies: BTreeMap<String, bool>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// Fold per-dependency reachability into a report; healthy only if all are reachable
    pub fn from_results(dependencies: BTreeMap<String, bool>) -> Self {
        let status = if dependencies.values().all(|reachable| *reachable) {
            HealthState::Healthy
        } else {
            HealthState::Degraded
        };
        Self {
            status,
            dependencies,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

pub struct HealthAggregator {
    probes: Vec<Arc<dyn DependencyProbe>>,
    timeout: Duration,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field(
                "probes",
                &self.probes.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HealthAggregator {
    pub fn new(probes: Vec<Arc<dyn DependencyProbe>>, timeout: Duration) -> Self {
        Self { probes, timeout }
    }

    /// Probe every dependency concurrently and fold the results
    pub async fn check(&self) -> HealthReport {
        let results = join_all(self.probes.iter().map(|probe| async move {
            let reachable = match tokio::time::timeout(self.timeout, probe.probe()).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!("Health probe for {} failed: {}", probe.name(), e);
                    false
                }
                Err(_) => {
                    warn!(
                        "Health probe for {} timed out after {:?}",
                        probe.name(),
                        self.timeout
                    );
                    false
                }
            };
            (probe.name().to_string(), reachable)
        }))
        .await;

        HealthReport::from_results(results.into_iter().collect())
    }
}

/// Probes the external provider with its minimal listing call
pub struct ProviderProbe {
    name: String,
    provider: Arc<dyn ResourceProvider>,
}

impl std::fmt::Debug for ProviderProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderProbe")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ProviderProbe {
    pub fn new(name: impl Into<String>, provider: Arc<dyn ResourceProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }
}

#[async_trait]
impl DependencyProbe for ProviderProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self) -> Result<(), String> {
        self.provider.probe().await.map_err(|e| e.to_string())
    }
}

/// Probes an HTTP health endpoint; any 2xx answer counts as reachable
#[derive(Debug)]
pub struct HttpProbe {
    name: String,
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(
        name: impl Into<String>,
        client: reqwest::Client,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DependencyProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self) -> Result<(), String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("{} returned {}", self.url, response.status()))
        }
    }
}

/// Fetch `version` from a dependency's `/version` endpoint
///
/// Bounded by `timeout`; any failure yields `"unknown"`.
pub async fn fetch_dependency_version(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> String {
    let url = format!("{base_url}/version");

    let result = async {
        let response = client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }
        let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
        body.get("version")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| "response has no version field".to_string())
    }
    .await;

    result.unwrap_or_else(|e| {
        warn!("Could not retrieve dependency version from {}: {}", url, e);
        UNKNOWN_VERSION.to_string()
    })
}
