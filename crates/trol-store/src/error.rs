/// Errors from remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key cannot be stored by this backend.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot currently serve requests (connection lost,
    /// poisoned lock, closed handle).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data does not have the layout the backend wrote.
    #[error("corrupt entry: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
