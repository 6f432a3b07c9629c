//! # AWS Resource Provider
//!
//! [`ResourceProvider`] backed by the AWS Rust SDK: S3 for bucket listing and
//! Systems Manager Parameter Store for parameters.
//!
//! Credentials come from the default provider chain, which covers IRSA
//! (IAM Roles for Service Accounts) on EKS, environment variables and
//! shared profiles. No operation retries on failure; the SDK's own retry
//! layer is disabled so the connector reports the first failure verbatim.

mod errors;
mod parameter_store;
mod s3;

use crate::config::ConnectorConfig;
use crate::provider::{
    BucketListing, ParameterListing, ParameterValue, ProviderError, ResourceProvider,
};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_ssm::Client as SsmClient;
use tracing::info;

/// AWS provider implementation
pub struct AwsResourceProvider {
    s3: S3Client,
    ssm: SsmClient,
    region: String,
}

impl std::fmt::Debug for AwsResourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsResourceProvider")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsResourceProvider {
    /// Create S3 and Parameter Store clients for the configured region
    ///
    /// When `aws_endpoint_url` is set both clients target that endpoint and S3
    /// switches to path-style addressing (LocalStack and similar).
    pub async fn new(config: &ConnectorConfig) -> Self {
        let sdk_config = Self::load_sdk_config(config).await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.aws_endpoint_url.is_some())
            .build();

        info!("AWS clients initialized for region: {}", config.aws_region);

        Self {
            s3: S3Client::from_conf(s3_config),
            ssm: SsmClient::new(&sdk_config),
            region: config.aws_region.clone(),
        }
    }

    /// Load SDK config from the default credential chain
    async fn load_sdk_config(config: &ConnectorConfig) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.aws_timeout())
                    .build(),
            );

        if let Some(endpoint) = &config.aws_endpoint_url {
            info!("Using AWS endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}

#[async_trait]
impl ResourceProvider for AwsResourceProvider {
    async fn list_buckets(&self) -> Result<BucketListing, ProviderError> {
        s3::list_buckets(&self.s3).await
    }

    async fn list_parameters(
        &self,
        path_prefix: Option<&str>,
    ) -> Result<ParameterListing, ProviderError> {
        parameter_store::list_parameters(&self.ssm, path_prefix).await
    }

    async fn get_parameter(
        &self,
        name: &str,
        decrypt: bool,
    ) -> Result<ParameterValue, ProviderError> {
        parameter_store::get_parameter(&self.ssm, name, decrypt).await
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        s3::probe(&self.s3).await
    }
}
