//! Value codecs for trol.
//!
//! A property converts its typed value to bytes before it reaches the
//! remote store, and back after a fetch. The conversion is an injected
//! [`Codec`], chosen per property.
//!
//! # Codecs
//!
//! - [`StrCodec`], [`IntCodec`], [`FloatCodec`], [`BytesCodec`] -- human
//!   readable codecs for the [`Native`] value types
//! - [`BincodeCodec`] -- the generic default object codec
//! - [`JsonCodec`] -- structured text, portable across systems
//! - [`FnCodec`] -- a pair of closures
//! - [`ModelRefCodec`] -- references to model instances
//!
//! The generic default is compact but its byte layout follows the Rust type
//! definition. Any field whose stored bytes must survive a schema or version
//! change should inject an explicit codec.

pub mod error;
pub mod model_ref;
pub mod native;
pub mod serde_codecs;
pub mod traits;

pub use error::{CodecError, CodecResult};
pub use model_ref::{ModelRef, ModelRefCodec};
pub use native::{BytesCodec, FloatCodec, IntCodec, Native, StrCodec};
pub use serde_codecs::{BincodeCodec, JsonCodec};
pub use traits::{Codec, FnCodec};
