//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize relative request URLs to absolute ones
//! - Filter routes by method (`ALL` is a wildcard)
//! - Run each compiled pattern against the path (or full URL)
//! - Zip parameter tokens with captures into `Params`
//!
//! # Design Decisions
//! - Every matching route is returned, in registration order; the order is
//!   the middleware stack order
//! - No implicit fallback: an empty result is the "no match" signal
//! - Optional parameters that did not participate are left out of `Params`

use std::sync::Arc;
use url::Url;

use crate::routing::route::{Route, RouteTable};

/// Host used when a request carries only a path.
pub const PLACEHOLDER_ORIGIN: &str = "http://domain";

/// Parameters captured for one route, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a value, keeping the first insertion position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A route that matched a request, with its captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Route,
    pub params: Arc<Params>,
}

impl RouteMatch {
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Parse a request URL, prefixing a placeholder origin when it is only a path.
pub fn normalize_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.starts_with("http") {
        return Url::parse(raw);
    }
    let separator = if raw.starts_with('/') { "" } else { "/" };
    Url::parse(&format!("{}{}{}", PLACEHOLDER_ORIGIN, separator, raw))
}

/// Match one route against a normalized URL.
pub fn match_route(route: &Route, url: &Url) -> Option<Params> {
    let pattern = route.pattern();
    let subject = if pattern.is_host_qualified() {
        url.as_str()
    } else {
        url.path()
    };

    let captures = pattern.exec(subject)?;
    let params = pattern
        .params()
        .zip(captures)
        .filter_map(|(token, capture)| capture.map(|value| (token.name.to_string(), value)))
        .collect();
    Some(params)
}

/// Scan the table in registration order and collect every match.
pub fn match_routes(table: &RouteTable, url: &Url, method: &axum::http::Method) -> Vec<RouteMatch> {
    table
        .iter()
        .filter(|route| route.method().accepts(method))
        .filter_map(|route| {
            match_route(route, url).map(|params| RouteMatch {
                route: route.clone(),
                params: Arc::new(params),
            })
        })
        .collect()
}
