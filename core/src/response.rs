//! Executed responses and on-demand coercion of their bodies.
//!
//! # Design
//! The engine materializes at most one result per response: decoded text,
//! a decoded JSON value, or the still-open body stream. Coercion methods
//! convert that result into the shape the caller asks for without mutating
//! it, except `take_stream`, which hands the connection to the caller.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::codec::{self, Codec};
use crate::error::{RestError, RestResult};
use crate::transport::ConnectionHandle;

pub(crate) enum Outcome {
    Empty,
    Text(String),
    Json(Value),
    Stream(ResponseStream),
}

/// The result of one executed request.
pub struct Response {
    code: u16,
    message: String,
    content_type: String,
    length: Option<u64>,
    outcome: Outcome,
    codec: Arc<dyn Codec>,
}

impl Response {
    pub(crate) fn new(
        code: u16,
        message: String,
        content_type: String,
        length: Option<u64>,
        outcome: Outcome,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            code,
            message,
            content_type,
            length,
            outcome,
            codec,
        }
    }

    /// HTTP status code, e.g. `200`.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Canonical reason phrase for the status code, e.g. `OK` for 200.
    /// The server's own reason text is not preserved; unregistered codes
    /// give an empty string.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `Content-Type` of the response, empty when the server sent none.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Declared `Content-Length`, if any.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// True when a body was materialized (2xx/3xx responses only).
    pub fn has_result(&self) -> bool {
        !matches!(self.outcome, Outcome::Empty)
    }

    /// True when the body was left open as a byte stream.
    pub fn is_stream(&self) -> bool {
        matches!(self.outcome, Outcome::Stream(_))
    }

    /// The body as text. JSON results are re-rendered through the codec.
    pub fn as_string(&self) -> RestResult<Option<String>> {
        match &self.outcome {
            Outcome::Empty => Ok(None),
            Outcome::Text(text) => Ok(Some(text.clone())),
            Outcome::Json(value) => self.codec.encode(value).map(Some),
            Outcome::Stream(_) => Err(stream_mismatch("text")),
        }
    }

    /// The body as a JSON value. Text results are parsed through the codec.
    pub fn as_json_value(&self) -> RestResult<Option<Value>> {
        match &self.outcome {
            Outcome::Empty => Ok(None),
            Outcome::Text(text) => self.codec.decode(text).map(Some),
            Outcome::Json(value) => Ok(Some(value.clone())),
            Outcome::Stream(_) => Err(stream_mismatch("JSON value")),
        }
    }

    /// The body narrowed to a JSON object.
    pub fn as_json_object(&self) -> RestResult<Option<Map<String, Value>>> {
        match self.as_json_value()? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(RestError::TypeMismatch(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The body narrowed to a JSON array.
    pub fn as_json_array(&self) -> RestResult<Option<Vec<Value>>> {
        match self.as_json_value()? {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(RestError::TypeMismatch(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The body decoded into any deserializable shape.
    pub fn as_type<T: DeserializeOwned>(&self) -> RestResult<Option<T>> {
        match &self.outcome {
            Outcome::Empty => Ok(None),
            Outcome::Text(text) => codec::decode_typed(self.codec.as_ref(), text).map(Some),
            Outcome::Json(value) => Ok(Some(T::deserialize(value)?)),
            Outcome::Stream(_) => Err(stream_mismatch(std::any::type_name::<T>())),
        }
    }

    /// Take the open body stream, leaving the response without a result.
    /// Fails for buffered text or JSON results.
    pub fn take_stream(&mut self) -> RestResult<Option<ResponseStream>> {
        match std::mem::replace(&mut self.outcome, Outcome::Empty) {
            Outcome::Empty => Ok(None),
            Outcome::Stream(stream) => Ok(Some(stream)),
            buffered => {
                self.outcome = buffered;
                Err(RestError::TypeMismatch(
                    "buffered response cannot be read as a stream".to_string(),
                ))
            }
        }
    }

    pub fn into_stream(mut self) -> RestResult<Option<ResponseStream>> {
        self.take_stream()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match &self.outcome {
            Outcome::Empty => "none",
            Outcome::Text(_) => "text",
            Outcome::Json(_) => "json",
            Outcome::Stream(_) => "stream",
        };
        f.debug_struct("Response")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("content_type", &self.content_type)
            .field("length", &self.length)
            .field("result", &result)
            .finish()
    }
}

fn stream_mismatch(target: &str) -> RestError {
    RestError::TypeMismatch(format!("cannot convert streaming response to [{target}]"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// An open response body that owns its connection.
///
/// Closing or dropping the stream releases the connection.
pub struct ResponseStream {
    reader: Box<dyn Read + Send>,
    _connection: ConnectionHandle,
}

impl ResponseStream {
    pub(crate) fn new(reader: Box<dyn Read + Send>, connection: ConnectionHandle) -> Self {
        Self {
            reader,
            _connection: connection,
        }
    }

    /// Release the underlying connection.
    pub fn close(self) {
        drop(self);
    }
}

impl Read for ResponseStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream").finish_non_exhaustive()
    }
}
