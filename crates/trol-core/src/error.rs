//! Error types for property operations.

use thiserror::Error;
use trol_codec::CodecError;
use trol_store::StoreError;

/// Errors that can occur while reading, writing, or syncing a property.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// No local value and no remote value exist for the key.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// The property was used before a name was assigned to it.
    #[error("property has no name")]
    Unnamed,

    /// The owner has no store handle to talk to.
    #[error("no store bound for key: {key}")]
    Unbound { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl PropertyError {
    /// Returns `true` if this error only means "the value is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

/// Convenience type alias for property operations.
pub type Result<T> = std::result::Result<T, PropertyError>;
