//! REST error mapping.
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}` with a matching status.

use api_shared::{ErrorDetail, ErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use biotrack_core::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = match self {
            ApiError::BadRequest(detail)
            | ApiError::NotFound(detail)
            | ApiError::Conflict(detail) => detail,
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                "An internal error occurred".to_string()
            }
        };

        let body = ErrorRes {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidInput(_) | TrackerError::InvalidRecord { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            TrackerError::TreatmentNotFound(_) => ApiError::NotFound(err.to_string()),
            TrackerError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            TrackerError::DataDirCreation(_)
            | TrackerError::FileRead(_)
            | TrackerError::FileWrite(_)
            | TrackerError::Serialization(_)
            | TrackerError::Deserialization(_) => ApiError::Internal(err.to_string()),
        }
    }
}
