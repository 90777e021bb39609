//! Route-parameter substitution and query-string encoding.
//!
//! A template may contain `{name}` placeholders, or their percent-encoded
//! form `%7Bname%7D`, anywhere in the path or the accumulated query string.
//! Substitution is purely textual and never touches the stored template.

use url::form_urlencoded;

use crate::error::{RestError, RestResult};

/// Form-URL-encode a value: alphanumerics and `*-._` pass through, spaces
/// become `+`, every other byte becomes `%XX`.
pub fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Replace every placeholder named in `routes` with its encoded value.
///
/// `routes` is a flat list of `name, value` pairs and must have even length.
/// Placeholders with no matching pair are left verbatim.
pub fn substitute(template: &str, routes: &[&str]) -> RestResult<String> {
    if routes.len() % 2 != 0 {
        return Err(RestError::InvalidArgument(format!(
            "even number of route parameters expected [{}]",
            routes.len()
        )));
    }
    let mut resolved = template.to_string();
    for pair in routes.chunks_exact(2) {
        let value = encode(pair[1]);
        for placeholder in [format!("{{{}}}", pair[0]), format!("%7B{}%7D", pair[0])] {
            if resolved.contains(&placeholder) {
                resolved = resolved.replace(&placeholder, &value);
            }
        }
    }
    Ok(resolved)
}

/// Append one `name=value` pair to an accumulated query string.
pub(crate) fn append_query(query: &mut String, name: &str, value: &str) {
    query.push(if query.is_empty() { '?' } else { '&' });
    query.push_str(name);
    query.push('=');
    query.push_str(&encode(value));
}
