//! # AWS S3 Bucket Listing

use super::errors::{classify_sdk_error, to_utc};
use crate::provider::pagination::{drain_pages, Page};
use crate::provider::{BucketListing, BucketSummary, ProviderError};
use aws_sdk_s3::Client as S3Client;
use tracing::{error, info};

/// List every bucket visible to the configured credentials, draining continuation tokens
pub(super) async fn list_buckets(client: &S3Client) -> Result<BucketListing, ProviderError> {
    info!("Fetching S3 buckets from AWS");

    let buckets = drain_pages(|token| async move {
        let response = client
            .list_buckets()
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| classify_sdk_error("s3:ListBuckets", &e))?;

        let items = response
            .buckets()
            .iter()
            .map(|bucket| BucketSummary {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket.creation_date().and_then(to_utc),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.continuation_token().map(str::to_string),
        })
    })
    .await
    .inspect_err(|e| error!("Error listing S3 buckets: {}", e))?;

    info!("Successfully retrieved {} S3 buckets", buckets.len());
    Ok(BucketListing::new(buckets))
}

/// Cheapest call that proves credentials and network path to S3
pub(super) async fn probe(client: &S3Client) -> Result<(), ProviderError> {
    client
        .list_buckets()
        .max_buckets(1)
        .send()
        .await
        .map(|_| ())
        .map_err(|e| classify_sdk_error("s3:ListBuckets", &e))
}
