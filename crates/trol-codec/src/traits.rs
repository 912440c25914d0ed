//! The [`Codec`] trait and the closure-backed [`FnCodec`].

use std::fmt;
use std::sync::Arc;

use crate::error::CodecResult;

/// A serializer/deserializer pair for values of type `T`.
///
/// Implementations must be pure: the same value always encodes to the same
/// bytes, and `decode(encode(v))` yields a value equal to `v`.
pub trait Codec<T>: Send + Sync {
    /// Convert a value into the bytes handed to the store.
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>>;

    /// Convert bytes read from the store back into a value.
    fn decode(&self, bytes: &[u8]) -> CodecResult<T>;
}

impl<T, C: Codec<T> + ?Sized> Codec<T> for Arc<C> {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        (**self).decode(bytes)
    }
}

type EncodeFn<T> = dyn Fn(&T) -> CodecResult<Vec<u8>> + Send + Sync;
type DecodeFn<T> = dyn Fn(&[u8]) -> CodecResult<T> + Send + Sync;

/// A codec built from two closures.
///
/// ```
/// use trol_codec::{Codec, CodecError, FnCodec};
///
/// let upper = FnCodec::new(
///     |s: &String| Ok(s.to_uppercase().into_bytes()),
///     |b: &[u8]| String::from_utf8(b.to_vec()).map_err(CodecError::from),
/// );
/// assert_eq!(upper.encode(&"hot".to_string()).unwrap(), b"HOT");
/// ```
pub struct FnCodec<T> {
    encode: Box<EncodeFn<T>>,
    decode: Box<DecodeFn<T>>,
}

impl<T> FnCodec<T> {
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&T) -> CodecResult<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&[u8]) -> CodecResult<T> + Send + Sync + 'static,
    {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<T> Codec<T> for FnCodec<T> {
    fn encode(&self, value: &T) -> CodecResult<Vec<u8>> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<T> {
        (self.decode)(bytes)
    }
}

impl<T> fmt::Debug for FnCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[derive(Debug, PartialEq)]
    struct HotNewThing {
        how_hot: i64,
    }

    fn hot_codec() -> FnCodec<HotNewThing> {
        FnCodec::new(
            |v: &HotNewThing| Ok(format!("<HOT>{}", v.how_hot).into_bytes()),
            |b: &[u8]| {
                let text = String::from_utf8(b.to_vec())?;
                let digits = text
                    .strip_prefix("<HOT>")
                    .ok_or_else(|| CodecError::Decode(format!("missing tag in {text:?}")))?;
                Ok(HotNewThing {
                    how_hot: digits.parse()?,
                })
            },
        )
    }

    #[test]
    fn closures_are_applied() {
        let codec = hot_codec();
        let bytes = codec.encode(&HotNewThing { how_hot: 10 }).unwrap();
        assert_eq!(bytes, b"<HOT>10");
        assert_eq!(codec.decode(&bytes).unwrap(), HotNewThing { how_hot: 10 });
    }

    #[test]
    fn closure_errors_pass_through() {
        let codec = hot_codec();
        assert!(matches!(codec.decode(b"cold"), Err(CodecError::Decode(_))));
        assert!(matches!(
            codec.decode(b"<HOT>very"),
            Err(CodecError::ParseInt(_))
        ));
    }

    #[test]
    fn arc_codec_delegates() {
        let codec: Arc<dyn Codec<HotNewThing>> = Arc::new(hot_codec());
        let bytes = codec.encode(&HotNewThing { how_hot: 3 }).unwrap();
        assert_eq!(bytes, b"<HOT>3");
    }
}
