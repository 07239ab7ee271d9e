//! Response normalization.
//!
//! The service may answer with a JSON-serialized buffer instead of the JSON
//! result itself:
//!
//! ```json
//! {"type": "Buffer", "data": [91, 93]}
//! ```
//!
//! Such a wrapper is decoded (each element is one code point, the resulting
//! text is parsed as JSON) to obtain the logical result. The wrapper is
//! recognized by a typed decode, not by sniffing for a `data` field: the
//! object must have exactly the `type` and `data` keys, `type` must be
//! `"Buffer"` and `data` must be an array of non-negative integers. Any other
//! value is returned unchanged.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EncodedBuffer {
    #[serde(rename = "type")]
    kind: BufferKind,
    data: Vec<u32>,
}

#[derive(Debug, Deserialize)]
enum BufferKind {
    Buffer,
}

impl EncodedBuffer {
    fn detect(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        EncodedBuffer::deserialize(value).ok()
    }

    fn into_json(self) -> Result<Value, ParseError> {
        match self.kind {
            BufferKind::Buffer => {
                let text = self
                    .data
                    .into_iter()
                    .map(|code| char::from_u32(code).ok_or(ParseError::BufferCodePoint(code)))
                    .collect::<Result<String, _>>()?;
                serde_json::from_str(&text).map_err(ParseError::BufferJson)
            }
        }
    }
}

/// Turn a parsed response body into the logical result.
pub fn normalize(parsed: Value) -> Result<Value, ParseError> {
    match EncodedBuffer::detect(&parsed) {
        Some(buffer) => buffer.into_json(),
        None => Ok(parsed),
    }
}
