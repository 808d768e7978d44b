//! Route definitions and the route table.
//!
//! # Responsibilities
//! - Define the method enumeration routes are registered under
//! - Bind (method, compiled pattern, action) into an immutable `Route`
//! - Keep routes in registration order
//!
//! # Design Decisions
//! - Append-only: the table is never sorted or reprioritized
//! - Routes are cheap handles (`Arc` pattern and action), so copying a
//!   route into another table keeps the same action instance
//! - Composition copies by value; no back-reference to the source table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::dispatch::{same_action, SharedAction};
use crate::error::PatternError;
use crate::routing::pattern::{is_host_qualified, Pattern, PatternOptions};

/// Methods a route can be registered for. `All` matches any request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    All,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::All => "ALL",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Whether a route registered under `self` accepts a request method.
    ///
    /// Request methods outside the enumeration (TRACE, CONNECT, extensions)
    /// only reach `All` routes.
    pub fn accepts(&self, request: &axum::http::Method) -> bool {
        match self {
            Method::All => true,
            method => method.as_str() == request.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for strings that are not a known route method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route method {0:?}")]
pub struct ParseMethodError(pub String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Method::All),
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

impl TryFrom<&axum::http::Method> for Method {
    type Error = ParseMethodError;

    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// A registered (method, pattern, action) triple. Immutable once built.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: Arc<Pattern>,
    action: SharedAction,
}

impl Route {
    pub fn new(method: Method, pattern: Arc<Pattern>, action: SharedAction) -> Self {
        Self {
            method,
            pattern,
            action,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The template string this route was compiled from.
    pub fn original(&self) -> &str {
        self.pattern.template()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn action(&self) -> &SharedAction {
        &self.action
    }

    /// Recompile this route under `prefix`, keeping method and action.
    pub fn prefixed(&self, prefix: &str, options: PatternOptions) -> Result<Route, PatternError> {
        if is_host_qualified(self.original()) {
            return Err(PatternError::HostQualifiedMount {
                template: self.original().to_string(),
            });
        }
        let template = join_paths(prefix, self.original());
        let pattern = Pattern::compile_with(&template, options)?;
        Ok(Route {
            method: self.method,
            pattern: Arc::new(pattern),
            action: Arc::clone(&self.action),
        })
    }

    /// Same action instance as `other`.
    pub fn same_action_as(&self, other: &Route) -> bool {
        same_action(&self.action, &other.action)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("original", &self.original())
            .finish_non_exhaustive()
    }
}

/// Join a mount prefix and a child template with exactly one separator.
pub fn join_paths(prefix: &str, child: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    if child.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{}/{}", prefix, child)
    }
}

/// Ordered, append-only collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn as_slice(&self) -> &[Route] {
        &self.routes
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
