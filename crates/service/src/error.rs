//! Error type for the service layer.
//!
//! Folds storage failures together with request rejection and authorization
//! denial, so the HTTP layer picks status codes with one match.

use checkflow_core::ValidationError;
use checkflow_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, state conflict, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller supplied invalid input; nothing was written.
    #[error("{0}")]
    Validation(String),

    /// Caller is authenticated but not allowed to touch this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl ServiceError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// True when the underlying storage lookup came up empty.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }

    /// True for state conflicts and unique-index violations.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Storage(StorageError::Conflict(_) | StorageError::Duplicate(_))
        )
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
