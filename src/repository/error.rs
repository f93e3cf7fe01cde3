use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by [`Repository`](super::Repository) operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No entity with the given id exists. Recoverable by the caller.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// An update tried to replace an entity with one carrying another id.
    #[error("{kind} id is immutable: expected '{expected}', got '{found}'")]
    IdChanged {
        kind: &'static str,
        expected: String,
        found: String,
    },

    /// The persistence layer failed; memory was left unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The repository was closed; no further mutations are accepted.
    #[error("{kind} repository is closed")]
    Closed { kind: &'static str },
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
