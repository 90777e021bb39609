use std::fmt;
use std::io::{self, Read, Write};

use crate::transfer;

const OCTET_STREAM: &str = "application/octet-stream";

/// A body read from a caller-supplied byte source.
///
/// With a known length the engine can send it in fixed-length mode; without
/// one the transport buffers it first.
pub struct StreamPayload {
    source: Box<dyn Read + Send>,
    length: Option<u64>,
    content_type: String,
}

impl StreamPayload {
    /// A source of unknown length.
    pub fn new(source: impl Read + Send + 'static) -> Self {
        Self::from_boxed(Box::new(source), None)
    }

    /// A source that yields exactly `length` bytes.
    pub fn with_length(source: impl Read + Send + 'static, length: u64) -> Self {
        Self::from_boxed(Box::new(source), Some(length))
    }

    pub(crate) fn from_boxed(source: Box<dyn Read + Send>, length: Option<u64>) -> Self {
        Self {
            source,
            length,
            content_type: OCTET_STREAM.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub(crate) fn write(self, sink: &mut dyn Write) -> io::Result<()> {
        match self.length {
            // never send more than was declared
            Some(length) => transfer::copy(self.source.take(length), sink)?,
            None => transfer::copy(self.source, sink)?,
        };
        Ok(())
    }
}

impl fmt::Debug for StreamPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPayload")
            .field("length", &self.length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
