//! In-memory transport double for engine tests.

use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::{RestError, RestResult};
use crate::http::{Method, ResponseHead};
use crate::transport::{Connection, Transport};

/// What one connection saw from the engine.
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorded {
    pub url: String,
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub fixed_length: Option<u64>,
    pub do_output: bool,
    pub connected: bool,
    pub body: Vec<u8>,
    /// The engine asked for the response, which sends the request.
    pub dispatched: bool,
    pub aborted: bool,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
pub(crate) struct MockTransport {
    code: u16,
    content_type: String,
    body: Vec<u8>,
    fail_on_response: bool,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
    pub disconnects: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new(code: u16, content_type: &str, body: &[u8]) -> Self {
        Self {
            code,
            content_type: content_type.to_string(),
            body: body.to_vec(),
            fail_on_response: false,
            recorded: Arc::default(),
            disconnects: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_on_response: true,
            ..Self::new(200, "", b"")
        }
    }

    pub fn last(&self) -> Recorded {
        self.recorded.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn open(&self, url: &Url, method: Method) -> RestResult<Box<dyn Connection>> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.push(Recorded {
            url: url.to_string(),
            method: Some(method),
            ..Recorded::default()
        });
        Ok(Box::new(MockConnection {
            transport: self.clone(),
            index: recorded.len() - 1,
            disconnected: false,
        }))
    }
}

struct MockConnection {
    transport: MockTransport,
    index: usize,
    disconnected: bool,
}

impl MockConnection {
    fn with_record<T>(&self, f: impl FnOnce(&mut Recorded) -> T) -> T {
        let mut recorded = self.transport.recorded.lock().unwrap();
        f(&mut recorded[self.index])
    }
}

struct RecordingWriter<'a> {
    connection: &'a MockConnection,
}

impl Write for RecordingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.connection.with_record(|r| r.body.extend_from_slice(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Connection for MockConnection {
    fn set_header(&mut self, name: &str, value: &str) {
        self.with_record(|r| {
            match r.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some(entry) => entry.1 = value.to_string(),
                None => r.headers.push((name.to_string(), value.to_string())),
            }
        });
    }

    fn set_fixed_length_streaming_mode(&mut self, length: u64) {
        self.with_record(|r| r.fixed_length = Some(length));
    }

    fn set_do_output(&mut self, enabled: bool) {
        self.with_record(|r| r.do_output = enabled);
    }

    fn connect(&mut self) -> RestResult<()> {
        self.with_record(|r| r.connected = true);
        Ok(())
    }

    fn output_stream(&mut self) -> RestResult<Box<dyn Write + '_>> {
        Ok(Box::new(RecordingWriter { connection: self }))
    }

    fn response(&mut self) -> RestResult<ResponseHead> {
        self.with_record(|r| r.dispatched = true);
        if self.transport.fail_on_response {
            return Err(RestError::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(ResponseHead {
            code: self.transport.code,
            message: "Mock".to_string(),
            content_length: Some(self.transport.body.len() as u64),
            content_type: self.transport.content_type.clone(),
        })
    }

    fn input_stream(&mut self) -> RestResult<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.transport.body.clone())))
    }

    fn abort(&mut self) -> Option<RestError> {
        self.with_record(|r| r.aborted = true);
        self.disconnect();
        None
    }

    fn disconnect(&mut self) {
        if !self.disconnected {
            self.disconnected = true;
            self.transport.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }
}
