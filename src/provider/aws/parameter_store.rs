//! # AWS Parameter Store Client
//!
//! Read-only access to AWS Systems Manager Parameter Store:
//! - Listing parameter metadata, optionally filtered by name prefix (`BeginsWith`)
//! - Resolving a single parameter value, decrypting `SecureString` on request

use super::errors::{classify_sdk_error, to_utc};
use crate::provider::pagination::{drain_pages, Page};
use crate::provider::{
    ParameterListing, ParameterSummary, ParameterType, ParameterValue, ProviderError,
};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::types::{ParameterMetadata, ParameterStringFilter};
use aws_sdk_ssm::Client as SsmClient;
use tracing::{error, info, warn};

/// List parameter metadata, applying the prefix as a server-side filter
pub(super) async fn list_parameters(
    client: &SsmClient,
    path_prefix: Option<&str>,
) -> Result<ParameterListing, ProviderError> {
    info!(
        "Fetching parameters from AWS Parameter Store (prefix: {:?})",
        path_prefix
    );

    let filter = path_prefix.map(name_prefix_filter).transpose()?;

    let parameters = drain_pages(|token| {
        let request = client
            .describe_parameters()
            .set_parameter_filters(filter.clone().map(|f| vec![f]))
            .set_next_token(token);

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| classify_sdk_error("ssm:DescribeParameters", &e))?;

            Ok(Page {
                items: response.parameters().iter().map(summary_from).collect(),
                next_token: response.next_token().map(str::to_string),
            })
        }
    })
    .await
    .inspect_err(|e| error!("Error listing parameters: {}", e))?;

    info!("Successfully retrieved {} parameters", parameters.len());
    Ok(ParameterListing::new(
        parameters,
        path_prefix.map(str::to_string),
    ))
}

/// Resolve a single parameter; `ParameterNotFound` becomes [`ProviderError::NotFound`]
pub(super) async fn get_parameter(
    client: &SsmClient,
    name: &str,
    decrypt: bool,
) -> Result<ParameterValue, ProviderError> {
    info!("Fetching parameter value: {} (decrypt: {})", name, decrypt);

    let response = client
        .get_parameter()
        .name(name)
        .with_decryption(decrypt)
        .send()
        .await
        .map_err(|e| {
            if e.as_service_error()
                .is_some_and(GetParameterError::is_parameter_not_found)
            {
                warn!("Parameter not found: {}", name);
                ProviderError::NotFound {
                    name: name.to_string(),
                }
            } else {
                let classified = classify_sdk_error("ssm:GetParameter", &e);
                error!("Error getting parameter {}: {}", name, classified);
                classified
            }
        })?;

    let Some(parameter) = response.parameter() else {
        warn!("GetParameter returned no parameter for {}", name);
        return Err(ProviderError::NotFound {
            name: name.to_string(),
        });
    };

    info!("Successfully retrieved parameter: {}", name);
    Ok(ParameterValue {
        name: parameter.name().unwrap_or(name).to_string(),
        value: parameter.value().unwrap_or_default().to_string(),
        parameter_type: parameter
            .r#type()
            .map_or(ParameterType::Unknown, parameter_type_from),
        version: parameter.version(),
        last_modified: parameter.last_modified_date().and_then(to_utc),
        arn: parameter.arn().unwrap_or_default().to_string(),
    })
}

fn name_prefix_filter(prefix: &str) -> Result<ParameterStringFilter, ProviderError> {
    ParameterStringFilter::builder()
        .key("Name")
        .option("BeginsWith")
        .values(prefix)
        .build()
        .map_err(|e| ProviderError::Internal(format!("invalid parameter filter: {e}")))
}

fn summary_from(metadata: &ParameterMetadata) -> ParameterSummary {
    ParameterSummary {
        name: metadata.name().unwrap_or_default().to_string(),
        parameter_type: metadata
            .r#type()
            .map_or(ParameterType::Unknown, parameter_type_from),
        last_modified: metadata.last_modified_date().and_then(to_utc),
        version: metadata.version(),
    }
}

fn parameter_type_from(sdk_type: &aws_sdk_ssm::types::ParameterType) -> ParameterType {
    use aws_sdk_ssm::types::ParameterType as Sdk;
    match sdk_type {
        Sdk::String => ParameterType::String,
        Sdk::StringList => ParameterType::StringList,
        Sdk::SecureString => ParameterType::SecureString,
        _ => ParameterType::Unknown,
    }
}
