//! Request-echo server used by the client's integration tests.
//!
//! Mirrors the handful of httpbin endpoints the tests rely on: arbitrary
//! status codes, basic-auth checks, request echoing, form and multipart
//! decoding, and fixed text, JSON and binary bodies.

use std::collections::{BTreeMap, HashMap};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Smallest valid PNG: signature plus IHDR, IDAT and IEND chunks of a 1x1 image.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub const TEXT: &str = "Mary had a little lamb.";

/// What `/anything` reports back about the request it received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub args: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub data: String,
    pub json: Value,
}

/// What `/upload` decoded from a multipart body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Upload {
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, UploadedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/basic-auth/{user}/{pass}", get(basic_auth))
        .route("/anything", any(anything))
        .route("/anything/{*rest}", any(anything))
        .route("/form", post(form))
        .route("/upload", post(upload))
        .route("/image/png", get(png))
        .route("/bytes/{n}", get(bytes))
        .route("/text", get(text))
        .route("/json", get(json_object))
        .route("/json/array", get(json_array))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn basic_auth(Path((user, pass)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")));
    let supplied = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if supplied == Some(expected.as_str()) {
        Json(json!({ "authenticated": true, "user": user })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"Fake Realm\"")],
        )
            .into_response()
    }
}

async fn anything(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Echo> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let data = String::from_utf8_lossy(&body).into_owned();
    let is_json = headers
        .get("content-type")
        .is_some_and(|ct| ct.contains("json"));
    let json = if is_json {
        serde_json::from_str(&data).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        args,
        headers,
        data,
        json,
    })
}

async fn form(Form(fields): Form<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "form": fields }))
}

async fn upload(mut multipart: Multipart) -> Result<Json<Upload>, Response> {
    let mut upload = Upload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(IntoResponse::into_response)?;
        let content = String::from_utf8_lossy(&data).into_owned();
        match filename {
            Some(filename) => {
                upload.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        content,
                    },
                );
            }
            None => {
                upload.fields.insert(name, content);
            }
        }
    }
    Ok(Json(upload))
}

async fn png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG)
}

async fn bytes(Path(n): Path<usize>) -> impl IntoResponse {
    let body: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
    ([(header::CONTENT_TYPE, "application/octet-stream")], body)
}

async fn text() -> &'static str {
    TEXT
}

async fn json_object() -> Json<Value> {
    Json(json!({ "slideshow": { "title": "Sample Slide Show", "slides": 2 } }))
}

async fn json_array() -> Json<Value> {
    Json(json!([1, 2, 3]))
}

async fn redirect() -> Redirect {
    Redirect::temporary("/json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_constant_has_png_signature() {
        assert_eq!(&PNG[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/anything".to_string(),
            args: BTreeMap::from([("q".to_string(), "1".to_string())]),
            headers: BTreeMap::new(),
            data: String::new(),
            json: Value::Null,
        };
        let text = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&text).unwrap();
        assert_eq!(back.method, "GET");
        assert_eq!(back.args["q"], "1");
    }

    #[test]
    fn upload_defaults_to_empty() {
        let upload: Upload = serde_json::from_str(r#"{"fields":{},"files":{}}"#).unwrap();
        assert!(upload.fields.is_empty());
        assert!(upload.files.is_empty());
    }
}
