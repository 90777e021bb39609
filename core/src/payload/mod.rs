//! Request bodies.
//!
//! # Design
//! A `Payload` describes itself (content type, length, streamability) before
//! the connection is opened, so the engine can choose between fixed-length
//! streaming and buffered transfer. `write` consumes the payload: stream
//! sources exhaust after one read, so a payload can only be sent once.
//!
//! `Body` is what callers hand to the verb methods. It is resolved into a
//! `Payload` by the engine, which is the only place that knows the codec.

mod form;
mod multipart;
mod stream;
mod text;

use std::fmt;
use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::Value;

use crate::codec::Codec;
use crate::error::RestResult;
use crate::http::APPLICATION_JSON;

pub use form::UrlEncodedForm;
pub use multipart::MultipartForm;
pub use stream::StreamPayload;
pub use text::TextPayload;

/// A self-describing, single-use request body.
#[derive(Debug)]
pub enum Payload {
    Text(TextPayload),
    Stream(StreamPayload),
    UrlEncoded(UrlEncodedForm),
    Multipart(MultipartForm),
}

impl Payload {
    pub fn content_type(&self) -> &str {
        match self {
            Payload::Text(p) => p.content_type(),
            Payload::Stream(p) => p.content_type(),
            Payload::UrlEncoded(p) => p.content_type(),
            Payload::Multipart(p) => p.content_type(),
        }
    }

    /// Total byte count, `None` when any source has an unknown length.
    pub fn length(&self) -> Option<u64> {
        match self {
            Payload::Text(p) => Some(p.length()),
            Payload::Stream(p) => p.length(),
            Payload::UrlEncoded(p) => Some(p.length()),
            Payload::Multipart(p) => p.length(),
        }
    }

    /// True when the full length is known up front.
    pub fn is_streamable(&self) -> bool {
        self.length().is_some()
    }

    /// Write the whole body to `sink` and flush it.
    pub fn write(self, sink: &mut dyn Write) -> io::Result<()> {
        match self {
            Payload::Text(p) => p.write(sink),
            Payload::Stream(p) => p.write(sink),
            Payload::UrlEncoded(p) => p.write(sink),
            Payload::Multipart(p) => p.write(sink),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Stream(_) => "stream",
            Payload::UrlEncoded(_) => "urlencoded",
            Payload::Multipart(_) => "multipart",
        }
    }
}

impl From<TextPayload> for Payload {
    fn from(p: TextPayload) -> Self {
        Payload::Text(p)
    }
}

impl From<StreamPayload> for Payload {
    fn from(p: StreamPayload) -> Self {
        Payload::Stream(p)
    }
}

impl From<UrlEncodedForm> for Payload {
    fn from(p: UrlEncodedForm) -> Self {
        Payload::UrlEncoded(p)
    }
}

impl From<MultipartForm> for Payload {
    fn from(p: MultipartForm) -> Self {
        Payload::Multipart(p)
    }
}

/// A request body as supplied by the caller.
pub enum Body {
    /// Sent as-is.
    Payload(Payload),
    /// Raw bytes of unknown length, sent as `application/octet-stream`.
    Stream(Box<dyn Read + Send>),
    /// Sent as `text/plain`.
    Text(String),
    /// Rendered through the client codec and sent as `application/json`.
    Object(Value),
}

impl Body {
    pub fn stream(source: impl Read + Send + 'static) -> Self {
        Body::Stream(Box::new(source))
    }

    /// Capture any serializable value for encoding with the client codec.
    pub fn object<T: Serialize + ?Sized>(value: &T) -> RestResult<Self> {
        Ok(Body::Object(serde_json::to_value(value)?))
    }

    pub(crate) fn resolve(self, codec: &dyn Codec) -> RestResult<Payload> {
        Ok(match self {
            Body::Payload(p) => p,
            Body::Stream(source) => StreamPayload::from_boxed(source, None).into(),
            Body::Text(text) => TextPayload::new(text).into(),
            Body::Object(value) => {
                TextPayload::with_content_type(codec.encode(&value)?, APPLICATION_JSON).into()
            }
        })
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Payload(p) => f.debug_tuple("Payload").field(p).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
            Body::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Body::Object(v) => f.debug_tuple("Object").field(v).finish(),
        }
    }
}

impl From<Payload> for Body {
    fn from(p: Payload) -> Self {
        Body::Payload(p)
    }
}

macro_rules! body_from_payload {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Body {
            fn from(p: $ty) -> Self {
                Body::Payload(p.into())
            }
        })*
    };
}

body_from_payload!(TextPayload, StreamPayload, UrlEncodedForm, MultipartForm);

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::json;
    use std::io::Cursor;

    fn written(payload: Payload) -> Vec<u8> {
        let mut sink = Vec::new();
        payload.write(&mut sink).unwrap();
        sink
    }

    #[test]
    fn text_body_resolves_to_plain_text() {
        let payload = Body::from("hello").resolve(&JsonCodec::default()).unwrap();
        assert_eq!(payload.content_type(), "text/plain");
        assert_eq!(payload.length(), Some(5));
        assert!(payload.is_streamable());
        assert_eq!(written(payload), b"hello");
    }

    #[test]
    fn raw_stream_resolves_to_unknown_length_octets() {
        let payload = Body::stream(Cursor::new(vec![1u8, 2, 3]))
            .resolve(&JsonCodec::default())
            .unwrap();
        assert_eq!(payload.content_type(), "application/octet-stream");
        assert_eq!(payload.length(), None);
        assert!(!payload.is_streamable());
        assert_eq!(written(payload), vec![1, 2, 3]);
    }

    #[test]
    fn objects_go_through_the_codec() {
        let body = Body::object(&json!({"name": "x"})).unwrap();
        let payload = body.resolve(&JsonCodec::compact()).unwrap();
        assert_eq!(payload.content_type(), "application/json");
        assert_eq!(payload.kind(), "text");
        assert_eq!(written(payload), br#"{"name":"x"}"#);
    }

    #[test]
    fn payloads_pass_through_unchanged() {
        let form = UrlEncodedForm::new().put("a", "1");
        let payload = Body::from(form).resolve(&JsonCodec::default()).unwrap();
        assert_eq!(payload.kind(), "urlencoded");
        assert_eq!(payload.content_type(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn json_value_converts_to_object_body() {
        assert!(matches!(Body::from(json!([1, 2])), Body::Object(_)));
    }
}
