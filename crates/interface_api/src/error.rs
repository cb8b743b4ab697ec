//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_kernel::ProviderError;
use domain_partner::PartnerError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

/// Message returned for every failure the caller cannot act on
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The body was not valid JSON for the endpoint
    #[error("Unprocessable body: {0}")]
    UnprocessableEntity(String),

    /// The body parsed but failed field validation
    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg, None)
            }
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                fields.join(", "),
                Some(fields),
            ),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
            ApiError::GatewayTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout", msg, None)
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PartnerError> for ApiError {
    fn from(err: PartnerError) -> Self {
        match err {
            PartnerError::Provider(provider) => provider.into(),
            other if other.is_not_found() => ApiError::NotFound(other.to_string()),
            other @ PartnerError::PartnerAlreadyExists => ApiError::Conflict(other.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::BadRequest { status: 404, message } => ApiError::NotFound(message),
            ProviderError::BadRequest { message, .. } => ApiError::BadRequest(message),
            ProviderError::CircuitOpen { name } => {
                warn!(breaker = %name, "Provider call short-circuited");
                ApiError::ServiceUnavailable("insurance provider unavailable".to_string())
            }
            ProviderError::DeadlineExceeded => {
                ApiError::GatewayTimeout("insurance provider did not answer in time".to_string())
            }
            other => {
                let detail = match other.raw_body() {
                    Some(body) => format!("{other} (body: {body})"),
                    None => other.to_string(),
                };
                ApiError::Internal(detail)
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| match &failure.message {
                    Some(message) => format!("[{field}]: {message}"),
                    None => format!("[{field}]: needs to satisfy '{}'", failure.code),
                })
            })
            .collect();
        fields.sort();
        ApiError::Validation(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnprocessableEntity(rejection.body_text())
    }
}
