//! Error types for knectar-site
//!
//! API failures are reported as `{"error": ..., "details"?: ...}` with the
//! status code carrying the category. Nothing is retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong shared secret (403)
    #[error("Forbidden")]
    Forbidden,

    /// Invalid request (400)
    #[error("{error}")]
    BadRequest {
        error: String,
        details: Option<String>,
    },

    /// Server-side failure (500)
    #[error("{error}")]
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.into(),
            details: None,
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.into(),
            details: None,
        }
    }

    pub fn internal_with(error: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Forbidden => json!({ "error": "Forbidden" }),
            ApiError::BadRequest { error, details } | ApiError::Internal { error, details } => {
                match details {
                    Some(details) => json!({ "error": error, "details": details }),
                    None => json!({ "error": error }),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
