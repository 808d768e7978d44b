//! Response model and finalization.
//!
//! # Responsibilities
//! - Represent status, status text, headers and body explicitly
//! - Merge a new payload into the live response field by field
//! - Convert the final response for the host transport
//!
//! # Design Decisions
//! - A full `Response` payload republishes its status and status text
//! - Caller overrides (`ResponseInit`) always win
//! - Headers merge as: live response, payload response, overrides
//! - A plain body keeps the live status unless overridden

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::fmt;

use crate::http::headers::merge_headers;

/// Response body.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    Full(Bytes),
    Stream(axum::body::Body),
}

impl Body {
    /// Buffered bytes, if the body is not a stream.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Empty => Some(&[][..]),
            Body::Full(bytes) => Some(bytes.as_ref()),
            Body::Stream(_) => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    pub fn into_axum(self) -> axum::body::Body {
        match self {
            Body::Empty => axum::body::Body::empty(),
            Body::Full(bytes) => axum::body::Body::from(bytes),
            Body::Stream(body) => body,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Body::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Full(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Full(Bytes::from(s))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Full(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Full(bytes)
    }
}

impl From<axum::body::Body> for Body {
    fn from(body: axum::body::Body) -> Self {
        Body::Stream(body)
    }
}

/// An outbound response.
#[derive(Debug, Default)]
pub struct Response {
    pub status: StatusCode,
    pub status_text: Option<String>,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Response {
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Body as UTF-8 text, if buffered.
    pub fn text(&self) -> Option<&str> {
        self.body.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Convert for the host transport.
    ///
    /// The status text has no equivalent in `http::Response` and is dropped.
    pub fn into_axum(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(self.body.into_axum());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Caller overrides applied when finalizing.
#[derive(Debug, Clone, Default)]
pub struct ResponseInit {
    pub status: Option<StatusCode>,
    pub status_text: Option<String>,
    pub headers: HeaderMap,
}

impl ResponseInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl From<StatusCode> for ResponseInit {
    fn from(status: StatusCode) -> Self {
        ResponseInit::new().status(status)
    }
}

/// What a terminal call hands to the context: a body or a prebuilt response.
#[derive(Debug)]
pub enum Payload {
    Body(Body),
    Response(Response),
}

impl Payload {
    pub fn empty() -> Self {
        Payload::Body(Body::Empty)
    }
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        Payload::Response(response)
    }
}

impl From<Body> for Payload {
    fn from(body: Body) -> Self {
        Payload::Body(body)
    }
}

impl From<&'static str> for Payload {
    fn from(s: &'static str) -> Self {
        Payload::Body(s.into())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Body(s.into())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Body(v.into())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Body(bytes.into())
    }
}

/// Build the next live response from the current one.
pub fn finalize(current: Response, payload: Payload, init: ResponseInit) -> Response {
    let (base_status, base_text, payload_headers, body) = match payload {
        Payload::Response(response) => (
            response.status,
            response.status_text,
            Some(response.headers),
            response.body,
        ),
        Payload::Body(body) => (current.status, current.status_text, None, body),
    };

    let (status, status_text) = match init.status {
        Some(status) => (status, init.status_text),
        None => (base_status, init.status_text.or(base_text)),
    };

    let headers = match &payload_headers {
        Some(payload_headers) => merge_headers([&current.headers, payload_headers, &init.headers]),
        None => merge_headers([&current.headers, &init.headers]),
    };

    Response {
        status,
        status_text,
        headers,
        body,
    }
}
