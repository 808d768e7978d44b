//! Per-request context shared by every action in a dispatch chain.
//!
//! # Responsibilities
//! - Hold the original request and its normalized URL
//! - Expose the parameters of the route currently on top of the stack
//! - Carry the request-scoped data bag
//! - Own the live response and its finalization helpers
//!
//! # Concurrency
//! Dispatch is strictly sequential: exactly one action holds `&mut Context`
//! at a time, which is what makes the shared data bag and the live response
//! safe without locking. Running sibling actions in parallel would break
//! that assumption and need explicit synchronization.

use axum::http::{header, HeaderValue, Extensions, Request};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::error::RouteError;
use crate::http::headers::merge_headers;
use crate::http::response::{finalize, Payload, Response, ResponseInit};
use crate::routing::Params;

/// Mutable state threaded through one dispatch.
pub struct Context {
    request: Request<axum::body::Body>,
    url: Url,
    params: Arc<Params>,
    response: Response,
    finalized: bool,
    data: Extensions,
}

impl Context {
    pub fn new(request: Request<axum::body::Body>, url: Url, data: Extensions) -> Self {
        Self {
            request,
            url,
            params: Arc::new(Params::new()),
            response: Response::default(),
            finalized: false,
            data,
        }
    }

    pub fn request(&self) -> &Request<axum::body::Body> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<axum::body::Body> {
        &mut self.request
    }

    pub fn method(&self) -> &axum::http::Method {
        self.request.method()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Parameters of the route currently active on the call stack.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub(crate) fn set_params(&mut self, params: Arc<Params>) {
        self.params = params;
    }

    /// Request-scoped values shared across the whole chain.
    pub fn data(&self) -> &Extensions {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Extensions {
        &mut self.data
    }

    /// The live response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutate the live response in place without finalizing it.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Whether any action has produced a response.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The final response, or `None` if nothing was produced.
    pub fn into_response(self) -> Option<Response> {
        self.finalized.then_some(self.response)
    }

    /// Replace the live response with `payload`, merging headers.
    pub fn end(&mut self, payload: impl Into<Payload>, init: ResponseInit) -> &Response {
        let current = std::mem::take(&mut self.response);
        self.response = finalize(current, payload.into(), init);
        self.finalized = true;
        &self.response
    }

    pub fn text(&mut self, body: impl Into<String>, init: ResponseInit) -> &Response {
        self.end_typed(body.into(), "text/plain; charset=utf-8", init)
    }

    pub fn html(&mut self, body: impl Into<String>, init: ResponseInit) -> &Response {
        self.end_typed(body.into(), "text/html; charset=utf-8", init)
    }

    pub fn json<T>(&mut self, value: &T, init: ResponseInit) -> Result<&Response, RouteError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        Ok(self.end_typed(body, "application/json", init))
    }

    fn end_typed(&mut self, body: impl Into<Payload>, content_type: &'static str, init: ResponseInit) -> &Response {
        let mut typed = axum::http::HeaderMap::new();
        typed.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        let init = ResponseInit {
            headers: merge_headers([&typed, &init.headers]),
            ..init
        };
        self.end(body, init)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("url", &self.url.as_str())
            .field("params", &self.params)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}
