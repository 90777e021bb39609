use std::io::{self, Write};

/// An in-memory string body, sent as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPayload {
    content: String,
    content_type: String,
}

impl TextPayload {
    /// A `text/plain` body.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_content_type(content, "text/plain")
    }

    pub fn with_content_type(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Byte length of the UTF-8 encoded content.
    pub fn length(&self) -> u64 {
        self.content.len() as u64
    }

    pub(crate) fn write(self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(self.content.as_bytes())?;
        sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_utf8_bytes_not_chars() {
        let payload = TextPayload::new("naïve ☕");
        assert_eq!(payload.length(), "naïve ☕".len() as u64);
        assert_eq!(payload.length(), 10);
    }

    #[test]
    fn custom_content_type_is_kept() {
        let payload = TextPayload::with_content_type("<a/>", "application/xml");
        assert_eq!(payload.content_type(), "application/xml");
        assert_eq!(payload.content(), "<a/>");
    }
}
