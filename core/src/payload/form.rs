use std::io::{self, Write};

use crate::route;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An `application/x-www-form-urlencoded` body built from `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlEncodedForm {
    data: String,
}

impl UrlEncodedForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair; the value is form-URL-encoded, the key is taken as-is.
    pub fn put(mut self, key: &str, value: &str) -> Self {
        if !self.data.is_empty() {
            self.data.push('&');
        }
        self.data.push_str(key);
        self.data.push('=');
        self.data.push_str(&route::encode(value));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        FORM_URLENCODED
    }

    pub fn length(&self) -> u64 {
        self.data.len() as u64
    }

    pub(crate) fn write(self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(self.data.as_bytes())?;
        sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_joined_with_ampersand() {
        let form = UrlEncodedForm::new().put("name", "Mary Lamb").put("age", "7");
        assert_eq!(form.as_str(), "name=Mary+Lamb&age=7");
        assert_eq!(form.length(), 20);
    }

    #[test]
    fn values_are_percent_encoded() {
        let form = UrlEncodedForm::new().put("q", "a&b=c/ü");
        assert_eq!(form.as_str(), "q=a%26b%3Dc%2F%C3%BC");
        assert_eq!(form.length(), form.as_str().len() as u64);
    }

    #[test]
    fn empty_form_writes_nothing() {
        let form = UrlEncodedForm::new();
        assert_eq!(form.length(), 0);
        let mut sink = Vec::new();
        form.write(&mut sink).unwrap();
        assert!(sink.is_empty());
    }
}
