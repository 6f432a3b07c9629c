//! # Error Mapping
//!
//! The protocol-visible error taxonomy shared by both tiers and its mapping
//! onto HTTP status codes:
//!
//! | Condition                           | Status                 |
//! |-------------------------------------|------------------------|
//! | Outbound call exceeded its timeout  | 504                    |
//! | Upstream answered with an error     | upstream's own status  |
//! | Requested name does not exist       | 404                    |
//! | Upstream could not be reached       | 503                    |
//! | Invalid or missing query argument   | 422                    |
//! | Anything else                       | 500                    |
//!
//! Every variant carries the upstream diagnostic text so nothing is lost on
//! the way to the caller. Responses are rendered as `{"detail": <message>}`.

use crate::provider::ProviderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Status used when an upstream rejection carries no usable HTTP status
const DEFAULT_UPSTREAM_STATUS: u16 = 502;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Unreachable(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error is surfaced with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream responded with a non-2xx status; the body text is kept verbatim
    pub fn upstream(status: u16, body: &str) -> Self {
        Self::Upstream {
            status,
            message: format!("Connector error: {body}"),
        }
    }

    /// Classify a failed outbound call made with `reqwest`
    ///
    /// Status errors never reach this function: the forwarder inspects the
    /// response status itself so it can keep the body text.
    pub fn from_forward_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("Connector timeout: {err}"))
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Unreachable(format!("Cannot reach connector: {err}"))
        } else if err.is_decode() {
            Self::Internal(format!("Internal error: invalid connector response: {err}"))
        } else {
            Self::Internal(format!("Internal error: {err}"))
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err {
            ProviderError::NotFound { .. } => Self::NotFound(message),
            ProviderError::Rejected { status, .. } => Self::Upstream {
                status: status.unwrap_or(DEFAULT_UPSTREAM_STATUS),
                message,
            },
            ProviderError::Unavailable(_) => Self::Unreachable(message),
            ProviderError::Timeout(_) => Self::Timeout(message),
            ProviderError::Internal(_) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
