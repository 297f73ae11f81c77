pub mod handlers;
pub mod responses;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned for any malformed or invalid request body.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Body of every error response.
///
/// ```json
/// { "error": "This student is already enrolled" }
/// ```
///
/// `details` is only present for field-level validation failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Field errors reported by the validator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// Application error type shared by all HTTP handlers.
///
/// Business rule violations (missing references, duplicates, a second
/// answer, a past start date) are all client errors and map to `400` with
/// the rule's own message. Only infrastructure failures surface as `5xx`,
/// and their details stay in the logs.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed body or failed field validation.
    #[error("Validation failed")]
    Validation(Option<serde_json::Value>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_)
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(serde_json::to_value(&errors).ok())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(details) => {
                tracing::info!(details = ?details, "Request validation failed");
                ErrorResponse {
                    error: VALIDATION_FAILED.to_string(),
                    details,
                }
            }
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidInput(msg) => {
                tracing::info!(status = %status, "{}", msg);
                ErrorResponse::new(msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                ErrorResponse::new("Internal server error")
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                ErrorResponse::new("Service unavailable")
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_business_errors_are_bad_requests_with_their_message() {
        for err in [
            AppError::NotFound("This plan does not exist".into()),
            AppError::Conflict("This plan does not exist".into()),
            AppError::InvalidInput("This plan does not exist".into()),
        ] {
            let (status, body) = body_of(err).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({ "error": "This plan does not exist" }));
        }
    }

    #[tokio::test]
    async fn test_validation_error_message() {
        let (status, body) = body_of(AppError::Validation(None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            body_of(AppError::InternalServerError("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
