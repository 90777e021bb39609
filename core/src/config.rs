//! Client and transport configuration.
//!
//! # Design
//! `ClientConfig` is an immutable snapshot: every `Request` derived from a
//! `Client` holds an `Arc` to the configuration as it was at derivation
//! time, so later client edits never leak into existing requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{Codec, JsonCodec};
use crate::transport::{Transport, UreqTransport};

const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Settings for the default ureq-backed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Limit for establishing the TCP/TLS connection. `None` waits forever.
    pub connect_timeout: Option<Duration>,
    /// Limit for receiving the response head and body. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Redirects followed before the 3xx response is returned as-is.
    pub max_redirects: u32,
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            read_timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Everything a request needs from its client.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Default headers, last write wins.
    pub headers: HashMap<String, String>,
    pub codec: Arc<dyn Codec>,
    pub transport: Arc<dyn Transport>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: HashMap::new(),
            codec: Arc::new(JsonCodec::default()),
            transport: Arc::new(UreqTransport::default()),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
