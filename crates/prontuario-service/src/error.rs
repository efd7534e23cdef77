//! API errors and their JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prontuario_compiler::{CompileError, RegistryError};
use serde::Serialize;

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
}

/// Request failures with their HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The note did not compile; the message is passed through verbatim.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The server failed; the detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<CompileError> for ApiError {
    fn from(err: CompileError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
