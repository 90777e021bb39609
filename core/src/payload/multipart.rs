//! `multipart/form-data` bodies.
//!
//! The form is kept as an ordered list of parts. Field headers, field values
//! and boundaries are rendered into literal byte segments when they are
//! added, so the total length is known as soon as every file part declares
//! its size.

use std::fmt;
use std::io::{self, Cursor, Read, Write};

use serde::Serialize;
use uuid::Uuid;

use crate::error::RestResult;
use crate::route;
use crate::transfer;

const CRLF: &str = "\r\n";

enum Part {
    Literal(Vec<u8>),
    Stream {
        source: Box<dyn Read + Send>,
        length: Option<u64>,
    },
}

impl Part {
    fn length(&self) -> Option<u64> {
        match self {
            Part::Literal(bytes) => Some(bytes.len() as u64),
            Part::Stream { length, .. } => *length,
        }
    }
}

/// A `multipart/form-data` body.
pub struct MultipartForm {
    boundary: String,
    content_type: String,
    parts: Vec<Part>,
}

impl MultipartForm {
    /// A form with a fresh random boundary made only of token characters.
    pub fn new() -> Self {
        Self::with_boundary(format!("----{}", Uuid::new_v4().simple()))
    }

    /// A form with a caller-chosen boundary. Boundaries holding characters
    /// outside the MIME token set are quoted in the content type.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        let content_type = if boundary.bytes().all(is_token_byte) {
            format!("multipart/form-data; boundary={boundary}")
        } else {
            format!("multipart/form-data; boundary=\"{boundary}\"")
        };
        Self {
            content_type,
            boundary,
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Add a plain field. The value is form-URL-encoded.
    pub fn add(self, field: &str, value: &str) -> Self {
        let encoded = route::encode(value);
        self.add_field(field, "text/plain; charset=UTF-8", &encoded)
    }

    /// Add a field holding `value` serialized as compact JSON.
    pub fn add_json<T: Serialize + ?Sized>(self, field: &str, value: &T) -> RestResult<Self> {
        let json = serde_json::to_string(value)?;
        Ok(self.add_field(field, "application/json", &json))
    }

    /// Add a file part read from `source`. Pass the size when it is known so
    /// the form can be sent in fixed-length mode.
    pub fn add_file(
        mut self,
        field: &str,
        filename: &str,
        source: impl Read + Send + 'static,
        length: Option<u64>,
    ) -> Self {
        let content_type = mime_guess::from_path(filename).first_or_octet_stream();
        let header = format!(
            "--{boundary}{CRLF}\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"{CRLF}\
             Content-Type: {content_type}{CRLF}\
             Content-Transfer-Encoding: binary{CRLF}{CRLF}",
            boundary = self.boundary,
        );
        self.parts.push(Part::Literal(header.into_bytes()));
        self.parts.push(Part::Stream {
            source: Box::new(source),
            length,
        });
        self.parts.push(Part::Literal(CRLF.as_bytes().to_vec()));
        self
    }

    /// Add a file part whose content is already in memory.
    pub fn add_file_text(self, field: &str, filename: &str, content: impl Into<String>) -> Self {
        let bytes = content.into().into_bytes();
        let length = bytes.len() as u64;
        self.add_file(field, filename, Cursor::new(bytes), Some(length))
    }

    /// Total encoded size, `None` if any file part has an unknown size.
    pub fn length(&self) -> Option<u64> {
        let mut total = self.closing().len() as u64;
        for part in &self.parts {
            total += part.length()?;
        }
        Some(total)
    }

    pub(crate) fn write(self, sink: &mut dyn Write) -> io::Result<()> {
        let closing = self.closing();
        for part in self.parts {
            match part {
                Part::Literal(bytes) => sink.write_all(&bytes)?,
                Part::Stream {
                    source,
                    length: Some(length),
                } => {
                    transfer::copy(source.take(length), sink)?;
                }
                Part::Stream { source, length: None } => {
                    transfer::copy(source, sink)?;
                }
            }
        }
        sink.write_all(closing.as_bytes())?;
        sink.flush()
    }

    fn add_field(mut self, field: &str, content_type: &str, value: &str) -> Self {
        let segment = format!(
            "--{boundary}{CRLF}\
             Content-Disposition: form-data; name=\"{field}\"{CRLF}\
             Content-Type: {content_type}{CRLF}{CRLF}\
             {value}{CRLF}",
            boundary = self.boundary,
        );
        self.parts.push(Part::Literal(segment.into_bytes()));
        self
    }

    fn closing(&self) -> String {
        format!("--{}--{CRLF}", self.boundary)
    }
}

/// RFC 2045 token characters: visible ASCII except space and tspecials.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b)
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MultipartForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartForm")
            .field("boundary", &self.boundary)
            .field("parts", &self.parts.len())
            .field("length", &self.length())
            .finish()
    }
}
