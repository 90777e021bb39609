//! Error type for request execution and response coercion.
//!
//! # Design
//! Every failure surfaces as one `RestError` value whose variant names the
//! kind of failure. Network, protocol and URL errors keep their underlying
//! cause as the error source. HTTP status codes are never errors: a 404 or a
//! 500 comes back as a normal `Response` and the caller inspects `code()`.

use thiserror::Error;

/// Boxed underlying cause carried by transport and protocol failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type RestResult<T> = Result<T, RestError>;

/// Errors returned while building, executing or coercing a request.
#[derive(Debug, Error)]
pub enum RestError {
    /// A caller-supplied argument was rejected, e.g. an odd number of route
    /// parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The resolved endpoint could not be parsed as a URL.
    #[error("malformed endpoint [{url}]: {source}")]
    MalformedEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The exchange violated HTTP rules (bad method, header or framing).
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// I/O failed while connecting, sending the body or reading the response.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// The stored response cannot be converted into the requested shape.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// The structured-text codec failed to encode or decode a value.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl RestError {
    pub(crate) fn transport(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        RestError::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        RestError::Protocol {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<std::io::Error> for RestError {
    fn from(err: std::io::Error) -> Self {
        RestError::Transport {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
