//! # Resource Types
//!
//! Listings and values produced by a [`ResourceProvider`](super::ResourceProvider).
//!
//! Listings are built fresh per request and are immutable once produced. The
//! `count` field is derived from the item sequence at construction, so it can
//! never disagree with the number of items serialized.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Parameter Store value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    StringList,
    /// Encrypted at rest; plaintext is only returned when decryption is requested
    SecureString,
    /// Type reported by the provider that this service does not know about
    Unknown,
}

impl ParameterType {
    pub fn is_secret(self) -> bool {
        matches!(self, Self::SecureString)
    }
}

/// Parameter metadata as returned by a listing (no value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    pub last_modified: Option<DateTime<Utc>>,
    pub version: i64,
}

/// A resolved parameter including its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterValue {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    pub version: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub arn: String,
}

/// Ordered bucket listing, serialized as `{buckets, count}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketListing {
    buckets: Vec<BucketSummary>,
    count: usize,
}

impl BucketListing {
    pub fn new(buckets: Vec<BucketSummary>) -> Self {
        let count = buckets.len();
        Self { buckets, count }
    }

    pub fn buckets(&self) -> &[BucketSummary] {
        &self.buckets
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Ordered parameter listing, serialized as `{parameters, count, path_prefix}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterListing {
    parameters: Vec<ParameterSummary>,
    count: usize,
    path_prefix: Option<String>,
}

impl ParameterListing {
    pub fn new(parameters: Vec<ParameterSummary>, path_prefix: Option<String>) -> Self {
        let count = parameters.len();
        Self {
            parameters,
            count,
            path_prefix,
        }
    }

    pub fn parameters(&self) -> &[ParameterSummary] {
        &self.parameters
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }
}
