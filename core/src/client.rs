//! Client and request builders.
//!
//! # Design
//! `Client` holds a base URL, default headers, the codec and the transport.
//! `Client::request` snapshots that configuration into an `Arc`, so requests
//! are unaffected by later client edits. A `Request` adds its own headers and
//! an append-only query string, and can be executed any number of times,
//! sequentially or from several threads, since execution only reads it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::basic_auth;
use crate::codec::Codec;
use crate::config::{ClientConfig, TransportConfig};
use crate::engine;
use crate::error::RestResult;
use crate::http::{self, Method, ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE};
use crate::payload::Body;
use crate::response::Response;
use crate::route;
use crate::transport::{Transport, UreqTransport};

/// Entry point: a base endpoint plus defaults shared by its requests.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// A client rooted at `base_url` (typically `http://` or `https://`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
        }
    }

    /// Set a default header. Names are case-insensitive; the last write wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        http::put_header(&mut self.config.headers, name.into(), value.into());
        self
    }

    /// Remove a default header. Requests already created keep it.
    pub fn clear(mut self, name: &str) -> Self {
        http::remove_header(&mut self.config.headers, name);
        self
    }

    pub fn basic(self, username: &str, password: &str) -> Self {
        self.header(AUTHORIZATION, basic_auth::header_value(username, password))
    }

    pub fn clear_basic(self) -> Self {
        self.clear(AUTHORIZATION)
    }

    /// Send and accept JSON by default.
    pub fn json(self) -> Self {
        self.header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
    }

    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.config.codec = Arc::new(codec);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.config.transport = Arc::new(transport);
        self
    }

    /// Replace the transport with a ureq transport built from `config`.
    pub fn transport_config(self, config: &TransportConfig) -> Self {
        self.transport(UreqTransport::new(config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A request for `path`, appended verbatim to the base URL. The path may
    /// contain `{name}` route placeholders.
    pub fn request(&self, path: impl Into<String>) -> Request {
        Request {
            client: Arc::new(self.config.clone()),
            headers: self.config.headers.clone(),
            path: path.into(),
            query: String::new(),
        }
    }

    /// A request for the base URL itself.
    pub fn root_request(&self) -> Request {
        self.request("")
    }
}

/// A reusable request template derived from a `Client`.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) client: Arc<ClientConfig>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) path: String,
    pub(crate) query: String,
}

impl Request {
    /// Set a header, replacing a client default of the same name in any case.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        http::put_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Remove a header from this request. Client defaults still apply.
    pub fn clear(mut self, name: &str) -> Self {
        http::remove_header(&mut self.headers, name);
        self
    }

    pub fn basic(self, username: &str, password: &str) -> Self {
        self.header(AUTHORIZATION, basic_auth::header_value(username, password))
    }

    pub fn clear_basic(self) -> Self {
        self.clear(AUTHORIZATION)
    }

    pub fn json(self) -> Self {
        self.header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
    }

    /// Append a query parameter. The value is URL-encoded; both name and
    /// value may hold route placeholders. Parameters accumulate and repeated
    /// names are kept.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        route::append_query(&mut self.query, name, value);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The accumulated query string, including the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Execute a GET. `routes` is a flat list of placeholder name/value
    /// pairs, e.g. `&["id", "42"]`.
    pub fn get(&self, routes: &[&str]) -> RestResult<Response> {
        self.execute(Method::Get, None, routes)
    }

    pub fn head(&self, routes: &[&str]) -> RestResult<Response> {
        self.execute(Method::Head, None, routes)
    }

    pub fn delete(&self, routes: &[&str]) -> RestResult<Response> {
        self.execute(Method::Delete, None, routes)
    }

    pub fn post(&self, body: impl Into<Body>, routes: &[&str]) -> RestResult<Response> {
        self.execute(Method::Post, Some(body.into()), routes)
    }

    pub fn put(&self, body: impl Into<Body>, routes: &[&str]) -> RestResult<Response> {
        self.execute(Method::Put, Some(body.into()), routes)
    }

    pub fn execute(&self, method: Method, body: Option<Body>, routes: &[&str]) -> RestResult<Response> {
        engine::execute(self, method, body, routes)
    }
}
