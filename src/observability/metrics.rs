//! # Metrics
//!
//! Prometheus metrics for both tiers, held in an injectable registry.
//!
//! ## Metrics Exposed
//!
//! - `<ns>_requests_total{method,endpoint,status}` - Total inbound requests
//! - `<ns>_request_duration_seconds{method,endpoint}` - Inbound request duration
//! - `<ns>_provider_calls_total{service,operation,outcome}` - Provider calls (connector tier)
//!
//! `<ns>` is the tier namespace (`gateway` or `connector`). The endpoint label
//! is the raw request path; path parameters are not substituted.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::future::Future;
use std::time::Duration;

/// Outcome label of a provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Attempt,
    Success,
    Error,
}

impl CallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attempt => "attempt",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Process-wide request metrics
///
/// Created once at startup and shared by handle (`Arc`) with every request
/// path. All updates go through prometheus' atomic counters, so concurrent
/// requests can record without additional locking.
#[derive(Clone)]
pub struct RequestMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    provider_calls_total: IntCounterVec,
}

impl std::fmt::Debug for RequestMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestMetrics").finish_non_exhaustive()
    }
}

impl RequestMetrics {
    /// Create and register all metrics under `namespace`
    #[allow(
        clippy::missing_errors_doc,
        reason = "Registration only fails for invalid metric names or duplicates"
    )]
    pub fn new(namespace: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Total request count").namespace(namespace),
            &["method", "endpoint", "status"],
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
                .namespace(namespace),
            &["method", "endpoint"],
        )?;

        let provider_calls_total = IntCounterVec::new(
            Opts::new("provider_calls_total", "Total calls to the external provider API")
                .namespace(namespace),
            &["service", "operation", "outcome"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(provider_calls_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            provider_calls_total,
        })
    }

    /// Record one completed request: one counter increment and one duration sample
    pub fn record(&self, method: &str, endpoint: &str, status: u16, duration: Duration) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[method, endpoint])
            .observe(duration.as_secs_f64());
    }

    pub fn record_provider_call(&self, service: &str, operation: &str, outcome: CallOutcome) {
        self.provider_calls_total
            .with_label_values(&[service, operation, outcome.as_str()])
            .inc();
    }

    /// Count an attempt, await `call`, then count its success or error
    pub async fn observe_provider_call<T, E, F>(&self, service: &str, operation: &str, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.record_provider_call(service, operation, CallOutcome::Attempt);
        let result = call.await;
        let outcome = if result.is_ok() {
            CallOutcome::Success
        } else {
            CallOutcome::Error
        };
        self.record_provider_call(service, operation, outcome);
        result
    }

    /// Requests recorded so far for one label set
    pub fn request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .get()
    }

    /// Duration samples recorded so far for one (method, endpoint) pair
    pub fn duration_samples(&self, method: &str, endpoint: &str) -> u64 {
        self.request_duration
            .with_label_values(&[method, endpoint])
            .get_sample_count()
    }

    pub fn provider_call_count(&self, service: &str, operation: &str, outcome: CallOutcome) -> u64 {
        self.provider_calls_total
            .with_label_values(&[service, operation, outcome.as_str()])
            .get()
    }

    /// Render the registry in the Prometheus text exposition format
    #[allow(
        clippy::missing_errors_doc,
        reason = "Encoding only fails on invalid metric families"
    )]
    pub fn snapshot(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
