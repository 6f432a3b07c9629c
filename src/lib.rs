//! Cloud Resource Gateway Library
//!
//! Two-tier read-only HTTP access to cloud resources (S3 buckets and SSM
//! Parameter Store). The connector tier talks to AWS; the gateway tier
//! forwards to the connector. Both tiers share configuration, error mapping,
//! health aggregation and metrics from this crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod forwarder;
pub mod health;
pub mod observability;
pub mod provider;
pub mod server;
