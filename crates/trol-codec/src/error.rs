//! Error types for value encoding and decoding.

use thiserror::Error;

/// Errors raised while converting values to or from stored bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The stored bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Stored bytes were expected to be UTF-8 text.
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("invalid float: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

/// Convenience type alias for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
