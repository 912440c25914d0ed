//! Human-readable codecs for the native value types.
//!
//! Text is stored the way a person would type it into a store client:
//! strings as UTF-8, numbers as decimal text. Bytes are stored verbatim.

use crate::error::CodecResult;
use crate::traits::Codec;

/// A value type with a built-in codec, usable as a property type hint.
pub trait Native: Sized + Send + Sync + 'static {
    type Codec: Codec<Self> + Default + 'static;
}

/// UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrCodec;

impl Codec<String> for StrCodec {
    fn encode(&self, value: &String) -> CodecResult<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<String> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Signed integers as decimal text, e.g. `42`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntCodec;

impl Codec<i64> for IntCodec {
    fn encode(&self, value: &i64) -> CodecResult<Vec<u8>> {
        Ok(value.to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<i64> {
        Ok(String::from_utf8(bytes.to_vec())?.trim().parse()?)
    }
}

/// Floats as the shortest decimal text that parses back to the same value.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatCodec;

impl Codec<f64> for FloatCodec {
    fn encode(&self, value: &f64) -> CodecResult<Vec<u8>> {
        Ok(value.to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<f64> {
        Ok(String::from_utf8(bytes.to_vec())?.trim().parse()?)
    }
}

/// Raw bytes, stored unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn encode(&self, value: &Vec<u8>) -> CodecResult<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

impl Native for String {
    type Codec = StrCodec;
}

impl Native for i64 {
    type Codec = IntCodec;
}

impl Native for f64 {
    type Codec = FloatCodec;
}

impl Native for Vec<u8> {
    type Codec = BytesCodec;
}
