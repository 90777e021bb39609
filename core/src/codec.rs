//! Structured-text codec used for request objects and JSON responses.
//!
//! # Design
//! The codec works on `serde_json::Value` so it can sit behind a trait
//! object in the client configuration. Typed values are converted to and
//! from `Value` with serde at the edges (`encode_typed` / `decode_typed`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RestResult;

/// Encodes structured values to text and parses text back.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> RestResult<String>;
    fn decode(&self, text: &str) -> RestResult<Value>;
}

/// JSON codec backed by `serde_json`. Pretty-prints by default.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> RestResult<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    fn decode(&self, text: &str) -> RestResult<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Encode any serializable value through `codec`.
pub fn encode_typed<T: Serialize + ?Sized>(codec: &dyn Codec, value: &T) -> RestResult<String> {
    codec.encode(&serde_json::to_value(value)?)
}

/// Decode `text` through `codec` into the requested shape.
pub fn decode_typed<T: DeserializeOwned>(codec: &dyn Codec, text: &str) -> RestResult<T> {
    Ok(serde_json::from_value(codec.decode(text)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn pretty_is_the_default() {
        let text = JsonCodec::default().encode(&json!({"a": 1})).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn compact_output_has_no_whitespace() {
        let text = JsonCodec::compact().encode(&json!({"a": [1, 2]})).unwrap();
        assert_eq!(text, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn typed_values_cross_the_codec() {
        let codec = JsonCodec::compact();
        let text = encode_typed(&codec, &Point { x: 1, y: -2 }).unwrap();
        assert_eq!(text, r#"{"x":1,"y":-2}"#);
        let back: Point = decode_typed(&codec, &text).unwrap();
        assert_eq!(back, Point { x: 1, y: -2 });
    }

    #[test]
    fn bad_text_is_a_codec_error() {
        let err = JsonCodec::default().decode("not json").unwrap_err();
        assert!(matches!(err, RestError::Codec(_)));
    }
}
