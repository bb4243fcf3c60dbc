//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::upstream::submit::body_to_value;
use crate::upstream::SubmitError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch patient data")]
    AcquisitionFailed,
    #[error("No assessment has been computed yet")]
    NoPriorResult,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream returned status {status}")]
    UpstreamRejected { status: u16, body: String },
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::AcquisitionFailed => (
                StatusCode::BAD_GATEWAY,
                "ACQUISITION_FAILED",
                "Failed to fetch patient data".to_string(),
            ),
            ApiError::NoPriorResult => (
                StatusCode::CONFLICT,
                "NO_PRIOR_RESULT",
                "No assessment has been computed yet. Run an assessment first".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            // Upstream verdict passes through with its own status and body
            ApiError::UpstreamRejected { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                return (status, Json(body_to_value(body))).into_response();
            }
            ApiError::UpstreamUnreachable(detail) => {
                tracing::warn!(detail, "Upstream unreachable");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNREACHABLE",
                    "The clinical API did not respond".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            // Cause already logged by the run; callers get no retry guidance.
            CoreError::Acquisition(_) => ApiError::AcquisitionFailed,
            CoreError::NoPriorResult => ApiError::NoPriorResult,
            CoreError::Submission(SubmitError::Upstream { status, body }) => {
                ApiError::UpstreamRejected { status, body }
            }
            CoreError::Submission(SubmitError::Network(detail)) => {
                ApiError::UpstreamUnreachable(detail)
            }
            CoreError::HttpClient(e) => ApiError::Internal(e.to_string()),
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
        }
    }
}
