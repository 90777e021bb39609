//! Default transport backed by a blocking `ureq` agent.
//!
//! Buffered mode collects the body in memory and dispatches it when the
//! response is first requested. Fixed-length mode dispatches on a worker
//! thread at `connect` time and feeds the body through an OS pipe, so the
//! caller's writes reach the socket as they happen.

use std::io::{self, PipeWriter, Read, Write};
use std::thread::{self, JoinHandle};

use tracing::debug;
use ureq::http::{self, Response};
use ureq::{Agent, SendBody};
use url::Url;

use crate::config::TransportConfig;
use crate::error::{RestError, RestResult};
use crate::http::{Method, ResponseHead};
use crate::transport::{Connection, Transport};

/// Transport that opens connections through a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(config.max_redirects)
            .timeout_connect(config.connect_timeout)
            .timeout_recv_response(config.read_timeout)
            .timeout_recv_body(config.read_timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn open(&self, url: &Url, method: Method) -> RestResult<Box<dyn Connection>> {
        Ok(Box::new(UreqConnection {
            agent: self.agent.clone(),
            url: url.to_string(),
            method,
            headers: Vec::new(),
            fixed_length: None,
            do_output: false,
            state: State::Built,
        }))
    }
}

type Exchange = JoinHandle<RestResult<Response<ureq::Body>>>;

enum State {
    Built,
    Buffering(Vec<u8>),
    Streaming {
        writer: Option<PipeWriter>,
        exchange: Exchange,
    },
    Received {
        head: ResponseHead,
        body: Option<ureq::Body>,
    },
    Closed,
}

struct UreqConnection {
    agent: Agent,
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    fixed_length: Option<u64>,
    do_output: bool,
    state: State,
}

impl UreqConnection {
    fn request(&self) -> http::request::Builder {
        build_request(self.method, &self.url, &self.headers)
    }

    fn start_streaming(&mut self, length: u64) -> RestResult<()> {
        let (reader, writer) = io::pipe()?;
        let mut reader = ExactLength {
            inner: reader,
            remaining: length,
        };
        let agent = self.agent.clone();
        let request = self.request();
        let exchange = thread::Builder::new()
            .name("rest-exchange".to_string())
            .spawn(move || {
                let request = request
                    .body(SendBody::from_reader(&mut reader))
                    .map_err(|e| RestError::protocol(e.to_string(), e))?;
                agent.run(request).map_err(map_error)
            })?;
        self.state = State::Streaming {
            writer: Some(writer),
            exchange,
        };
        Ok(())
    }

    fn complete(&mut self) -> RestResult<Response<ureq::Body>> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Built => {
                let request = self
                    .request()
                    .body(())
                    .map_err(|e| RestError::protocol(e.to_string(), e))?;
                self.agent.run(request).map_err(map_error)
            }
            State::Buffering(buffer) => {
                let request = self
                    .request()
                    .body(buffer)
                    .map_err(|e| RestError::protocol(e.to_string(), e))?;
                self.agent.run(request).map_err(map_error)
            }
            State::Streaming { writer, exchange } => {
                // closing the pipe tells the worker the body is complete
                drop(writer);
                exchange
                    .join()
                    .map_err(|_| RestError::Transport {
                        message: "request worker panicked".to_string(),
                        source: None,
                    })?
            }
            State::Received { .. } | State::Closed => Err(RestError::Transport {
                message: "connection already completed".to_string(),
                source: None,
            }),
        }
    }
}

impl Connection for UreqConnection {
    fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn set_fixed_length_streaming_mode(&mut self, length: u64) {
        self.fixed_length = Some(length);
    }

    fn set_do_output(&mut self, enabled: bool) {
        self.do_output = enabled;
    }

    fn connect(&mut self) -> RestResult<()> {
        if !matches!(self.state, State::Built) || !self.do_output {
            return Ok(());
        }
        match self.fixed_length {
            Some(length) => {
                debug!(url = %self.url, length, "dispatching fixed-length request");
                self.start_streaming(length)
            }
            None => {
                self.state = State::Buffering(Vec::new());
                Ok(())
            }
        }
    }

    fn output_stream(&mut self) -> RestResult<Box<dyn Write + '_>> {
        if !self.do_output {
            return Err(RestError::Protocol {
                message: "output is not enabled on this connection".to_string(),
                source: None,
            });
        }
        self.connect()?;
        match &mut self.state {
            State::Buffering(buffer) => Ok(Box::new(buffer)),
            State::Streaming {
                writer: Some(writer),
                ..
            } => Ok(Box::new(writer)),
            _ => Err(RestError::Protocol {
                message: "request body already sent".to_string(),
                source: None,
            }),
        }
    }

    fn response(&mut self) -> RestResult<ResponseHead> {
        if let State::Received { head, .. } = &self.state {
            return Ok(head.clone());
        }
        let response = self.complete()?;
        let head = response_head(&response);
        self.state = State::Received {
            head: head.clone(),
            body: Some(response.into_body()),
        };
        Ok(head)
    }

    fn input_stream(&mut self) -> RestResult<Box<dyn Read + Send>> {
        self.response()?;
        match &mut self.state {
            State::Received { body, .. } => match body.take() {
                Some(body) => Ok(Box::new(body.into_reader())),
                None => Err(RestError::Transport {
                    message: "response body already taken".to_string(),
                    source: None,
                }),
            },
            _ => Err(RestError::Transport {
                message: "no response available".to_string(),
                source: None,
            }),
        }
    }

    fn abort(&mut self) -> Option<RestError> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Streaming { writer, exchange } => {
                // the body is short of its declared length, so the exchange cannot succeed
                drop(writer);
                match exchange.join() {
                    Ok(Err(err)) => Some(err),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn disconnect(&mut self) {
        self.state = State::Closed;
    }
}

/// Fails when the pipe closes before the declared length arrived, so a short
/// body aborts the exchange instead of completing it.
struct ExactLength<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> Read for ExactLength<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let max = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(buf.len());
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 && max > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "request body ended before its declared length",
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

fn build_request(method: Method, url: &str, headers: &[(String, String)]) -> http::request::Builder {
    headers.iter().fold(
        http::Request::builder().method(method.as_str()).uri(url),
        |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
    )
}

fn response_head<B>(response: &Response<B>) -> ResponseHead {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    ResponseHead {
        code: response.status().as_u16(),
        message: response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
        content_length: header("content-length").and_then(|v| v.trim().parse().ok()),
        content_type: header("content-type").unwrap_or_default(),
    }
}

fn map_error(err: ureq::Error) -> RestError {
    match err {
        ureq::Error::Io(e) => RestError::from(e),
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => RestError::protocol(err.to_string(), err),
        other => RestError::transport(other.to_string(), other),
    }
}
