//! Connection-level transport abstraction.
//!
//! # Design
//! The engine drives one `Connection` per execution through the same steps a
//! blocking URL connection exposes: set headers and transfer mode, connect,
//! write the body, read the status, then either drain the body or hand the
//! input stream to the caller. `UreqTransport` is the default backend; tests
//! substitute an in-memory double.

mod agent;
#[cfg(test)]
pub(crate) mod mock;

use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};

use url::Url;

use crate::error::{RestError, RestResult};
use crate::http::{Method, ResponseHead};

pub use agent::UreqTransport;

/// Opens connections to resolved URLs.
pub trait Transport: Send + Sync {
    fn open(&self, url: &Url, method: Method) -> RestResult<Box<dyn Connection>>;
}

/// A single request/response exchange.
pub trait Connection: Send {
    /// Set a request header, replacing any earlier value for the same name.
    fn set_header(&mut self, name: &str, value: &str);

    /// Send the body in fixed-length mode instead of buffering it.
    fn set_fixed_length_streaming_mode(&mut self, length: u64);

    fn set_do_output(&mut self, enabled: bool);

    fn connect(&mut self) -> RestResult<()>;

    /// Sink for the request body. Only valid after `set_do_output(true)`.
    fn output_stream(&mut self) -> RestResult<Box<dyn Write + '_>>;

    /// Status line and entity headers. The first call completes the request.
    fn response(&mut self) -> RestResult<ResponseHead>;

    /// Takes the response body. Can be called once per exchange.
    fn input_stream(&mut self) -> RestResult<Box<dyn Read + Send>>;

    /// Abandon the exchange after the body could not be written. Nothing
    /// that was buffered is sent. Returns the exchange's own failure when a
    /// request already in flight broke first.
    fn abort(&mut self) -> Option<RestError> {
        self.disconnect();
        None
    }

    /// Release the connection. Safe to call more than once.
    fn disconnect(&mut self);
}

/// Owns an open connection and disconnects it when dropped.
pub struct ConnectionHandle(Box<dyn Connection>);

impl ConnectionHandle {
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self(connection)
    }
}

impl Deref for ConnectionHandle {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for ConnectionHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}
