//! Errors shared by every storage handler

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A writer panicked while holding the in-memory lock
    #[error("in-memory store lock poisoned")]
    Poisoned,

    /// A stored row no longer matches the record types
    #[error("malformed record {id}: {reason}")]
    Malformed { id: String, reason: String }
}
