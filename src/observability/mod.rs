//! # Observability
//!
//! - `metrics`: Prometheus request and provider-call metrics
//! - `middleware`: axum middleware recording every request

pub mod metrics;
pub mod middleware;

pub use metrics::{CallOutcome, RequestMetrics};
