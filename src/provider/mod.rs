//! # Provider Modules
//!
//! The backend connector's view of the external cloud API.
//!
//! A provider exposes three read-only operations plus a cheap connectivity
//! probe. Every failure leaves the provider already classified as a
//! [`ProviderError`], so callers switch on a finite error kind instead of
//! inspecting message text. Providers never retry; retry policy belongs to
//! the caller.

use async_trait::async_trait;
use thiserror::Error;

pub mod aws;
pub mod pagination;
pub mod types;

pub use types::{
    BucketListing, BucketSummary, ParameterListing, ParameterSummary, ParameterType,
    ParameterValue,
};

/// Classified failure of a provider operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The requested parameter name does not exist upstream
    #[error("Parameter '{name}' not found")]
    NotFound { name: String },

    /// The provider was reached but answered with a structured error
    /// `status` is the provider's HTTP status when the SDK exposes it
    #[error("AWS Error: {code} - {message}")]
    Rejected {
        code: String,
        message: String,
        status: Option<u16>,
    },

    /// The provider could not be reached (DNS, refused, reset, credentials chain)
    #[error("AWS connection error: {0}")]
    Unavailable(String),

    /// The provider did not answer within the configured operation timeout
    #[error("AWS request timed out: {0}")]
    Timeout(String),

    /// Anything the classification above does not cover
    #[error("Unexpected error: {0}")]
    Internal(String),
}

/// Read-only access to cloud resource metadata
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// List all storage buckets in upstream order
    async fn list_buckets(&self) -> Result<BucketListing, ProviderError>;

    /// List parameters whose name begins with `path_prefix` (all when `None`)
    /// The prefix is applied upstream and every page is drained before returning
    async fn list_parameters(
        &self,
        path_prefix: Option<&str>,
    ) -> Result<ParameterListing, ProviderError>;

    /// Resolve a single parameter, decrypting secret values only when `decrypt` is set
    async fn get_parameter(&self, name: &str, decrypt: bool)
        -> Result<ParameterValue, ProviderError>;

    /// Minimal listing call used by the health check
    async fn probe(&self) -> Result<(), ProviderError>;
}
