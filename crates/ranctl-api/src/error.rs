//! HTTP-facing error type.
//!
//! The public contract collapses every failure into one of two shapes:
//! `400 {"error": "..."}` for anything the caller can fix by changing
//! the request, or `500` for the one case that isn't the caller's
//! fault -- the scheduler thread itself is unreachable. `NotFound` is
//! reported at 400 rather than 404, matching the original system's
//! choice not to let status codes leak which BS/UE/slice ids exist.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ranctl_rib::RibError;
use ranctl_rrm::RrmError;
use ranctl_scheduler::SchedulerError;
use serde_json::json;

/// Failure modes surfaced to an HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or a path parameter did not parse.
    #[error("{0}")]
    Parse(String),
    /// The request parsed but violates a semantic rule.
    #[error("{0}")]
    InvalidArgument(String),
    /// The referenced base station, UE, or slice does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The scheduler thread could not be reached, or did not reply
    /// within its command timeout.
    #[error("{0}")]
    Internal(String),
}

impl From<RibError> for ApiError {
    fn from(err: RibError) -> Self {
        match err {
            RibError::NoSuchBs(_) | RibError::UnknownAgent(_) => Self::NotFound(err.to_string()),
            RibError::WrongHandshakeState(_)
            | RibError::NoCapableAgent(_)
            | RibError::Network(_) => Self::InvalidArgument(err.to_string()),
        }
    }
}

impl From<RrmError> for ApiError {
    fn from(err: RrmError) -> Self {
        match err {
            RrmError::Rib(inner) => inner.into(),
            RrmError::NoSuchCell(..) | RrmError::NoSuchSlice(_) => Self::NotFound(err.to_string()),
            RrmError::UnsupportedTransform { .. } | RrmError::InvalidArgument(_) => {
                Self::InvalidArgument(err.to_string())
            }
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Parse(_) | Self::InvalidArgument(_) | Self::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
