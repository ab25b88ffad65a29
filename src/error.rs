//! Error types shared by the storage backends.

use thiserror::Error;

/// Failure of an [`ArticleStore`](crate::store::ArticleStore) operation.
///
/// `NotFound` is the only variant a client can cause by asking for
/// something that does not exist; every other variant is a storage fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Article not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
