//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Reconstruct the absolute request URL that routes are matched against
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Absolute-form request targets are used as-is; otherwise the `Host`
//!   header supplies the origin, then the placeholder origin

use axum::{
    body::Body,
    http::{header, uri::Authority, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use url::Url;
use uuid::Uuid;

use crate::routing::PLACEHOLDER_ORIGIN;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID attached to the request extensions and the dispatch data bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Axum middleware: reuse or mint an `x-request-id` and echo it on the response.
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| RequestId(v.to_string()))
        .unwrap_or_default();

    let header_value = HeaderValue::from_str(id.as_str()).ok();
    if let Some(value) = &header_value {
        req.headers_mut().insert(X_REQUEST_ID, value.clone());
    }
    req.extensions_mut().insert(id);

    let mut response = next.run(req).await;
    if let Some(value) = header_value {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// The absolute URL routes see for `req`.
///
/// The path and query always come from the request target. The `Host`
/// header only contributes an origin, and only when it is a plain
/// authority; anything else falls back to the placeholder origin.
pub fn request_url<B>(req: &Request<B>) -> Result<Url, url::ParseError> {
    let uri = req.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string());
    }

    let mut url = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(host_origin)
        .map_or_else(|| Url::parse(PLACEHOLDER_ORIGIN), Ok)?;

    url.set_path(uri.path());
    url.set_query(uri.query());
    Ok(url)
}

fn host_origin(host: &str) -> Option<Url> {
    let authority = host.parse::<Authority>().ok()?;
    if authority.as_str().contains('@') {
        return None;
    }
    Url::parse(&format!("http://{}/", authority.as_str())).ok()
}
