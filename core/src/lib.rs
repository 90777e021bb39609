//! Blocking HTTP request execution with self-describing payloads.
//!
//! # Overview
//! A `Client` holds a base endpoint and default headers. Each `Request`
//! derived from it adds a path template, its own headers and query
//! parameters, and is executed with one of the verb methods. The engine
//! substitutes route parameters, sends the body, and classifies the
//! response by content type: text and JSON bodies are read eagerly, every
//! other body is returned as an open stream that owns the connection.
//!
//! # Design
//! - Payloads report their length up front so known-size bodies are sent in
//!   fixed-length mode and only unknown-size bodies are buffered.
//! - The transport sits behind the `Transport`/`Connection` traits; the
//!   default is a blocking `ureq` agent.
//! - HTTP status codes are data, not errors: callers check `code()`.
//!
//! ```no_run
//! use rest_core::Client;
//!
//! let response = Client::new("http://localhost:3000/")
//!     .basic("ausername", "mpassword")
//!     .request("basic-auth/{user}/{pass}")
//!     .get(&["user", "ausername", "pass", "mpassword"])?;
//! assert_eq!(response.code(), 200);
//! # Ok::<(), rest_core::RestError>(())
//! ```

pub mod basic_auth;
pub mod client;
pub mod codec;
pub mod config;
mod engine;
pub mod error;
pub mod http;
pub mod payload;
pub mod response;
pub mod route;
pub mod transfer;
pub mod transport;

pub use client::{Client, Request};
pub use codec::{Codec, JsonCodec};
pub use config::{ClientConfig, TransportConfig};
pub use error::{RestError, RestResult};
pub use http::Method;
pub use payload::{Body, MultipartForm, Payload, StreamPayload, TextPayload, UrlEncodedForm};
pub use response::{Response, ResponseStream};
pub use transport::{Connection, ConnectionHandle, Transport, UreqTransport};
