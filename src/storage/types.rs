use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while opening the SQLite database, with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of ticklist appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

/// SQLite lock-related error messages
/// SQLITE_BUSY (5): database is locked
/// SQLITE_LOCKED (6): database table is locked
/// SQLITE_CANTOPEN (14): unable to open database file
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

/// Errors from a [`KeyValueStore`](super::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The value would exceed the store's quota.
    #[error("Value for '{key}' is {size} bytes, exceeding the {limit}-byte store limit")]
    TooLarge {
        key: String,
        size: usize,
        limit: usize,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the full-snapshot collection adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The persisted blob could not be deserialized. Fatal at load.
    #[error("Persisted collection '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted blob holds two records with the same id.
    #[error("Persisted collection '{key}' contains duplicate id '{id}'")]
    DuplicateId { key: String, id: String },

    #[error("Failed to serialize collection '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_messages_detected() {
        assert!(is_lock_message("error returned from database: database is locked"));
        assert!(is_lock_message("SQLITE_BUSY"));
        assert!(is_lock_message("unable to open database file"));
        assert!(!is_lock_message("no such table: kv_store"));
    }

    #[test]
    fn test_too_large_message() {
        let err = StoreError::TooLarge {
            key: "__todos_collection_key__".to_string(),
            size: 12,
            limit: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("12 bytes"));
        assert!(msg.contains("10-byte"));
    }
}
