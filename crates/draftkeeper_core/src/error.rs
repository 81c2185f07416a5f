//! Error types for core storage and the autosave persistence boundary.
use thiserror::Error;

/// Top-level storage/domain error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Document exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Internal server error")]
    Internal,
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

/// Failure reported by a [`crate::Persist`] implementation.
///
/// Cloneable so one settled request can resolve every waiter attached to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store answered but refused the write.
    #[error("save rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Another editor holds the document.
    #[error("document is locked: {0}")]
    Locked(String),

    /// The store could not be reached or the response was unreadable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The persistence task ended without producing a result.
    #[error("save aborted: {0}")]
    Aborted(String),
}

impl PersistenceError {
    /// Wrap a storage error raised by an in-process store.
    pub fn from_storage(err: &AppError) -> Self {
        match err {
            AppError::Locked(message) => Self::Locked(message.clone()),
            AppError::BadRequest(message) => Self::Rejected {
                status: 400,
                message: message.clone(),
            },
            AppError::PayloadTooLarge { .. } => Self::Rejected {
                status: 413,
                message: err.to_string(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}
