//! Route registration, lookup and dispatch.
//!
//! # Responsibilities
//! - Register routes through a chainable per-method builder
//! - Look up every matching route for a request
//! - Compose routers by copying routes under a prefix
//! - Run the matched chain and return the finalized response
//!
//! # Design Decisions
//! - Registration order is execution order; no specificity sorting
//! - Mounting is eager and flat: the child's routes are recompiled into the
//!   parent at mount time, later changes to the child are not seen
//! - Explicit no-match (`Ok(None)`) rather than a silent default response
//! - Invalid templates panic at registration, like `axum::Router::route`;
//!   `try_route` is the fallible form

use axum::http::{Extensions, Request};
use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::dispatch::{from_fn, Chain, Next, SharedAction};
use crate::error::{HandlerResult, PatternError, RouteError};
use crate::http::request::request_url;
use crate::http::{Context, Response};
use crate::routing::matcher::{match_routes, normalize_url, RouteMatch};
use crate::routing::pattern::{Pattern, PatternOptions};
use crate::routing::route::{Method, Route, RouteTable};

/// An ordered table of routes plus the dispatch entry point.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: RouteTable,
    config: RouterConfig,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            routes: RouteTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            case_sensitive: self.config.case_sensitive,
        }
    }

    pub fn all(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::All, template)
    }

    pub fn get(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Get, template)
    }

    pub fn post(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Post, template)
    }

    pub fn put(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Put, template)
    }

    pub fn patch(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Patch, template)
    }

    pub fn delete(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Delete, template)
    }

    pub fn head(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Head, template)
    }

    pub fn options(&mut self, template: &str) -> RouteBuilder<'_> {
        self.route(Method::Options, template)
    }

    /// Start registering actions for `method` and `template`.
    ///
    /// # Panics
    ///
    /// Panics if the template does not compile.
    pub fn route(&mut self, method: Method, template: &str) -> RouteBuilder<'_> {
        match self.try_route(method, template) {
            Ok(builder) => builder,
            Err(err) => panic!("Invalid route {template:?}: {err}"),
        }
    }

    pub fn try_route(&mut self, method: Method, template: &str) -> Result<RouteBuilder<'_>, PatternError> {
        let pattern = Pattern::compile_with(template, self.pattern_options())?;
        Ok(RouteBuilder {
            router: self,
            method,
            pattern: Arc::new(pattern),
        })
    }

    fn push(&mut self, route: Route) {
        tracing::debug!(
            method = %route.method(),
            route = route.original(),
            position = self.routes.len(),
            "Route registered"
        );
        self.routes.push(route);
    }

    /// Copy every route of `child` into this router under `prefix`.
    ///
    /// Each copied route keeps its method and action; its template becomes
    /// `prefix` joined with the child's template and is recompiled with this
    /// router's options.
    pub fn mount(&mut self, prefix: &str, child: &Router) -> Result<&mut Self, PatternError> {
        let options = self.pattern_options();
        let copied = child
            .routes
            .iter()
            .map(|route| route.prefixed(prefix, options))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(prefix, routes = copied.len(), "Router mounted");
        for route in copied {
            self.push(route);
        }
        Ok(self)
    }

    /// Every route matching `url` and `method`, in registration order.
    pub fn match_request(&self, url: &str, method: &axum::http::Method) -> Result<Vec<RouteMatch>, url::ParseError> {
        let url = normalize_url(url)?;
        Ok(match_routes(&self.routes, &url, method))
    }

    /// Dispatch a request with an empty data bag.
    pub async fn dispatch(&self, request: Request<axum::body::Body>) -> Result<Option<Response>, RouteError> {
        self.dispatch_with(request, Extensions::new()).await
    }

    /// Dispatch a request, seeding the shared data bag.
    ///
    /// Returns `Ok(None)` when no route matched or when no action produced a
    /// response; the caller decides what "not found" looks like.
    pub async fn dispatch_with(
        &self,
        request: Request<axum::body::Body>,
        data: Extensions,
    ) -> Result<Option<Response>, RouteError> {
        let url = request_url(&request)?;
        let matches = match_routes(&self.routes, &url, request.method());

        if matches.is_empty() {
            tracing::debug!(method = %request.method(), path = url.path(), "No route matched");
            return Ok(None);
        }

        tracing::debug!(
            method = %request.method(),
            path = url.path(),
            matched = matches.len(),
            "Dispatching request"
        );

        let chain = Chain::new(matches);
        let mut ctx = Context::new(request, url, data);
        chain.run(&mut ctx).await?;
        Ok(ctx.into_response())
    }
}

/// Chainable registration for one (method, template) pair.
pub struct RouteBuilder<'r> {
    router: &'r mut Router,
    method: Method,
    pattern: Arc<Pattern>,
}

impl<'r> RouteBuilder<'r> {
    /// Add a middleware that may run code around `next.run(ctx)`.
    pub fn middleware<F>(self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        self.action(from_fn(f))
    }

    /// Add a terminal handler. Handlers usually finalize the response and
    /// ignore the continuation.
    pub fn handle<F>(self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        self.action(from_fn(f))
    }

    /// Add an already shared action, e.g. a struct implementing `Action`.
    pub fn action(self, action: SharedAction) -> Self {
        let route = Route::new(self.method, Arc::clone(&self.pattern), action);
        self.router.push(route);
        self
    }

    /// Back to the owning router.
    pub fn router(self) -> &'r mut Router {
        self.router
    }
}
