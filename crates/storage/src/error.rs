//! Error type for the storage layer.
//!
//! Every backend operation returns `StorageError` so callers can branch on
//! the failure mode (missing row, state conflict, DB trouble) with plain
//! pattern matches.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The row a caller asked for does not exist, or is out of scope for them.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The row exists but its current state forbids the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A unique index rejected the write.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// sqlx reported a connection, timeout, or SQL failure.
    #[error("database: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored value would not decode into its domain type.
    #[error("corrupt row data: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema setup failed at startup.
    #[error("migration failed: {0}")]
    Migration(String),
}

impl StorageError {
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// True for unique-index violations.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Deliberately not a blanket `#[from]`: `RowNotFound` and SQLSTATE 23505
/// carry meaning the API layer turns into 404/409, so each gets its own
/// variant. The `NotFound` built here has no entity context; call sites that
/// know the entity use [`StorageError::not_found`] instead.
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound { entity: "row", id: 0 },
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                Self::Duplicate(db_err.message().to_owned())
            },
            _ => Self::Database(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption { context: "JSON column".to_owned(), source: Box::new(err) }
    }
}
