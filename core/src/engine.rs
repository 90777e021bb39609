//! Request execution.
//!
//! One call drives one connection through
//! `Built -> Connected -> BodySent -> ResponseReceived` and ends either
//! `Closed` (the engine released the connection) or `StreamingOpen` (the
//! returned `ResponseStream` owns it). Release on every other exit path,
//! errors included, is handled by `ConnectionHandle`'s drop.

use std::io;

use tracing::{debug, trace};
use url::Url;

use crate::client::Request;
use crate::error::{RestError, RestResult};
use crate::http::{Method, ResponseHead, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use crate::payload::{Body, Payload};
use crate::response::{Outcome, Response, ResponseStream};
use crate::route;
use crate::transfer;
use crate::transport::ConnectionHandle;

pub(crate) fn execute(
    request: &Request,
    method: Method,
    body: Option<Body>,
    routes: &[&str],
) -> RestResult<Response> {
    let config = request.client.as_ref();
    let url = resolve_url(request, routes)?;
    let payload = body
        .map(|body| body.resolve(config.codec.as_ref()))
        .transpose()?;

    debug!(
        %method,
        %url,
        payload = payload.as_ref().map(Payload::kind),
        length = payload.as_ref().and_then(Payload::length),
        "executing request"
    );

    let mut connection = ConnectionHandle::new(config.transport.open(&url, method)?);

    // explicit headers below override the payload's content type
    if let Some(payload) = &payload {
        connection.set_header(CONTENT_TYPE, payload.content_type());
    }
    for (name, value) in config.headers.iter().chain(request.headers.iter()) {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            trace!(header = %name, "setting header (value redacted)");
        } else {
            trace!(header = %name, %value, "setting header");
        }
        connection.set_header(name, value);
    }

    if let Some(length) = payload.as_ref().filter(|p| p.is_streamable()).and_then(Payload::length) {
        connection.set_fixed_length_streaming_mode(length);
        connection.set_header(CONTENT_LENGTH, &length.to_string());
    }

    connection.set_do_output(payload.is_some());
    connection.connect()?;

    if let Some(payload) = payload {
        let written = {
            let mut sink = connection.output_stream()?;
            payload.write(sink.as_mut())
        };
        if let Err(err) = written {
            debug!(error = %err, "request body failed, abandoning exchange");
            let cause = connection.abort();
            // a broken pipe only means the exchange died first
            return Err(match cause {
                Some(cause) if err.kind() == io::ErrorKind::BrokenPipe => cause,
                _ => err.into(),
            });
        }
    }

    let head = connection.response()?;
    debug!(
        code = head.code,
        content_type = %head.content_type,
        length = head.content_length,
        "response received"
    );

    let outcome = if head.has_body() {
        match classify(&head.content_type) {
            Classification::Text => {
                Outcome::Text(transfer::read_to_text(connection.input_stream()?)?)
            }
            Classification::Json => {
                let text = transfer::read_to_text(connection.input_stream()?)?;
                if text.trim().is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Json(config.codec.decode(&text)?)
                }
            }
            Classification::Stream => {
                let reader = connection.input_stream()?;
                debug!("handing open connection to response stream");
                return Ok(respond(
                    request,
                    head,
                    Outcome::Stream(ResponseStream::new(reader, connection)),
                ));
            }
        }
    } else {
        Outcome::Empty
    };

    drop(connection);
    Ok(respond(request, head, outcome))
}

fn resolve_url(request: &Request, routes: &[&str]) -> RestResult<Url> {
    let template = format!("{}{}{}", request.client.base_url, request.path, request.query);
    let resolved = route::substitute(&template, routes)?;
    Url::parse(&resolved).map_err(|source| RestError::MalformedEndpoint {
        url: resolved,
        source,
    })
}

fn respond(request: &Request, head: ResponseHead, outcome: Outcome) -> Response {
    Response::new(
        head.code,
        head.message,
        head.content_type,
        head.content_length,
        outcome,
        request.client.codec.clone(),
    )
}

#[derive(Debug, PartialEq, Eq)]
enum Classification {
    Text,
    Json,
    Stream,
}

/// Content types mentioning "text" are text, those mentioning "json" are
/// JSON, and everything else stays a byte stream.
fn classify(content_type: &str) -> Classification {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("text") {
        Classification::Text
    } else if content_type.contains("json") {
        Classification::Json
    } else {
        Classification::Stream
    }
}
