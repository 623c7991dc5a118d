//! HTTP-facing error type.
//!
//! Handlers return `Result<Json<T>, ApiError>`; the `IntoResponse` impl
//! turns each variant into the right status code with a small JSON body,
//! so no handler builds error responses by hand.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use checkflow_service::ServiceError;
use checkflow_storage::StorageError;

/// One variant per status code the API can answer with.
///
/// The response body is always `{"error": "message"}`. Only `Internal` hides
/// its cause from the client; the rest carry messages written for callers.
#[derive(Debug)]
pub enum ApiError {
    /// Caller input failed validation (400).
    BadRequest(String),
    /// Identity headers were missing or unusable (401).
    Unauthorized(String),
    /// Caller is known but not allowed this action (403).
    Forbidden(String),
    /// No such resource, or it is out of the caller's scope (404).
    NotFound(String),
    /// Resource exists but its state rejects the operation (409).
    Conflict(String),
    /// Unexpected failure; logged server-side, generic message to client (500).
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(err) => {
                tracing::error!(?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(ref e) if e.is_duplicate() => Self::Conflict(err.to_string()),
            ServiceError::Storage(StorageError::NotFound { entity, id }) => {
                Self::NotFound(format!("{entity} {id} not found"))
            },
            ServiceError::Storage(StorageError::Conflict(msg)) => Self::Conflict(msg),
            ServiceError::Validation(msg) => Self::BadRequest(msg),
            ServiceError::Forbidden(msg) => Self::Forbidden(msg),
            ServiceError::Storage(_) => Self::Internal(err.into()),
        }
    }
}
