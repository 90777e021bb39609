//! HTTP vocabulary shared by the engine and the transport.
//!
//! # Design
//! Methods are a closed enum: only the verbs the client exposes can reach the
//! transport. Header names are plain strings; the transport is responsible
//! for case-insensitive matching when the same header is set twice.

use std::collections::HashMap;
use std::fmt;

pub const AUTHORIZATION: &str = "Authorization";
pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";

pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names compare case-insensitively, so setting `content-type` replaces
/// an earlier `Content-Type`. The name keeps the casing of the latest write.
pub(crate) fn put_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    remove_header(headers, &name);
    headers.insert(name, value);
}

pub(crate) fn remove_header(headers: &mut HashMap<String, String>, name: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
}

/// Status line and entity metadata read back from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub code: u16,
    /// Canonical reason phrase for `code`, not the server's text.
    pub message: String,
    /// Declared `Content-Length`, `None` when the server did not send one.
    pub content_length: Option<u64>,
    /// Declared `Content-Type`, empty when absent.
    pub content_type: String,
}

impl ResponseHead {
    /// 2xx and 3xx responses carry a body worth classifying.
    pub fn has_body(&self) -> bool {
        (200..400).contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(code: u16) -> ResponseHead {
        ResponseHead {
            code,
            message: String::new(),
            content_length: None,
            content_type: String::new(),
        }
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mut headers = HashMap::new();
        put_header(&mut headers, "content-type".to_string(), "text/plain".to_string());
        put_header(&mut headers, "Content-Type".to_string(), "application/json".to_string());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Content-Type"], "application/json");

        remove_header(&mut headers, "CONTENT-TYPE");
        assert!(headers.is_empty());
    }

    #[test]
    fn method_renders_as_wire_name() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Head.as_str(), "HEAD");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn only_2xx_and_3xx_have_a_body() {
        assert!(!head(199).has_body());
        assert!(head(200).has_body());
        assert!(head(304).has_body());
        assert!(head(399).has_body());
        assert!(!head(400).has_body());
        assert!(!head(418).has_body());
        assert!(!head(500).has_body());
    }
}
