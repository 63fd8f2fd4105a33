//! Error types for vetwatch-ai
//!
//! Every handler error renders as `{"error": {"code", "message"}}`; failed
//! form validation adds the `errors` and `warnings` lists.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::forms::FormError;
use crate::vision::VisionError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Submitted form failed schema validation (400)
    #[error("Validation failed: {}", errors.join("; "))]
    Validation {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Form engine error
    #[error(transparent)]
    Form(#[from] FormError),

    /// Vision adapter error
    #[error(transparent)]
    Vision(#[from] VisionError),

    /// vetwatch-common error
    #[error("Common error: {0}")]
    Common(#[from] vetwatch_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::Internal(_) | ApiError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Form(FormError::UnknownFormType(_)) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_FORM_TYPE")
            }
            ApiError::Form(FormError::FormTypeMismatch { .. }) => {
                (StatusCode::BAD_REQUEST, "FORM_TYPE_MISMATCH")
            }
            ApiError::Vision(err) => match err {
                VisionError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "VISION_NOT_CONFIGURED"),
                VisionError::UnsupportedMediaType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
                }
                VisionError::Media(_) => (StatusCode::BAD_REQUEST, "INVALID_MEDIA"),
                VisionError::FrameExtraction(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "FRAME_EXTRACTION_FAILED")
                }
                VisionError::Network(_) | VisionError::Api { .. } | VisionError::InvalidResponse(_) => {
                    (StatusCode::BAD_GATEWAY, "VISION_UPSTREAM_ERROR")
                }
            },
            ApiError::Common(err) => match err {
                vetwatch_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                vetwatch_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                vetwatch_common::Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();

        let body = match self {
            ApiError::Validation { errors, warnings } => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "errors": errors,
                    "warnings": warnings,
                }
            }),
            _ => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
