//! # AWS Error Classification
//!
//! Maps AWS SDK failures onto [`ProviderError`] kinds. Service errors keep the
//! AWS error code and message verbatim along with the raw HTTP status.

use crate::provider::ProviderError;
use aws_sdk_ssm::config::http::HttpResponse;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error as StdError;

/// Classify an SDK error returned by `operation` (e.g. `"ssm:GetParameter"`)
pub(crate) fn classify_sdk_error<E>(operation: &str, err: &SdkError<E, HttpResponse>) -> ProviderError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(context) => {
            rejected(context.err(), Some(context.raw().status().as_u16()))
        }
        SdkError::TimeoutError(_) => {
            ProviderError::Timeout(format!("{operation} exceeded the operation timeout"))
        }
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            ProviderError::Timeout(format!("{operation}: {}", DisplayErrorContext(err)))
        }
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ProviderError::Unavailable(format!("{operation}: {}", DisplayErrorContext(err)))
        }
        SdkError::ConstructionFailure(_) => {
            ProviderError::Internal(format!("{operation}: {}", DisplayErrorContext(err)))
        }
        _ => ProviderError::Unavailable(format!("{operation}: {}", DisplayErrorContext(err))),
    }
}

/// Build a `Rejected` error from a modeled service error, keeping code and message verbatim
pub(crate) fn rejected<E>(service_error: &E, status: Option<u16>) -> ProviderError
where
    E: ProvideErrorMetadata + StdError,
{
    ProviderError::Rejected {
        code: service_error.code().unwrap_or("Unknown").to_string(),
        message: service_error
            .message()
            .map_or_else(|| service_error.to_string(), str::to_string),
        status,
    }
}

/// Convert an AWS timestamp to UTC
pub(crate) fn to_utc(timestamp: &aws_sdk_ssm::primitives::DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}
