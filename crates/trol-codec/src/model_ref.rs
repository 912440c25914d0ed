//! References to model instances, storable as a property value.
//!
//! A reference records what is needed to rebuild a handle to a model
//! instance: its model name, its id, and its key. Other attributes of the
//! instance are not captured.
//!
//! Wire format: `model 0xFE id 0xFE key`, with an absent field written as the
//! single byte `0xFC`. Neither byte can occur in UTF-8 text, so the format
//! is unambiguous.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

const SEPARATOR: u8 = 0xFE;
const ABSENT: u8 = 0xFC;

/// A reference to a model instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef {
    /// Name of the model the instance belongs to.
    pub model: String,
    /// Instance id, if it has one.
    pub id: Option<String>,
    /// Full remote key prefix of the instance, if known.
    pub key: Option<String>,
}

impl ModelRef {
    pub fn new(model: impl Into<String>, id: Option<String>, key: Option<String>) -> Self {
        Self {
            model: model.into(),
            id,
            key,
        }
    }
}

/// Codec for [`ModelRef`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelRefCodec;

fn push_field(out: &mut Vec<u8>, field: Option<&str>) {
    match field {
        Some(text) => out.extend_from_slice(text.as_bytes()),
        None => out.push(ABSENT),
    }
}

fn read_field(piece: &[u8]) -> CodecResult<Option<String>> {
    if piece == [ABSENT] {
        return Ok(None);
    }
    Ok(Some(String::from_utf8(piece.to_vec())?))
}

impl Codec<ModelRef> for ModelRefCodec {
    fn encode(&self, value: &ModelRef) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        push_field(&mut out, Some(&value.model));
        out.push(SEPARATOR);
        push_field(&mut out, value.id.as_deref());
        out.push(SEPARATOR);
        push_field(&mut out, value.key.as_deref());
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<ModelRef> {
        let pieces: Vec<&[u8]> = bytes.split(|b| *b == SEPARATOR).collect();
        let [model, id, key] = pieces.as_slice() else {
            return Err(CodecError::Decode(format!(
                "model reference has {} fields, expected 3",
                pieces.len()
            )));
        };
        let model = read_field(model)?
            .ok_or_else(|| CodecError::Decode("model reference without a model name".into()))?;
        Ok(ModelRef {
            model,
            id: read_field(id)?,
            key: read_field(key)?,
        })
    }
}
