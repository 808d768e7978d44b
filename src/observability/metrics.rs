//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, outcome;
//!   methods outside the route method set are labelled `OTHER`
//! - `router_dispatch_duration_seconds` (histogram): time spent in the chain
//!
//! # Design Decisions
//! - Macros are no-ops until a recorder is installed, so the router can be
//!   used as a library without an exporter
//! - Outcome is a small fixed label set to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::Method;

/// How one dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route produced a response.
    Handled,
    /// No route matched, or none finalized a response.
    NotFound,
    /// The chain failed.
    Error,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::NotFound => "not_found",
            Outcome::Error => "error",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Label for a request method, from a fixed set.
pub fn method_label(method: &axum::http::Method) -> &'static str {
    Method::try_from(method).map_or("OTHER", |m| m.as_str())
}

pub fn record_dispatch(method: &axum::http::Method, outcome: Outcome, start: Instant) {
    metrics::counter!(
        "router_requests_total",
        "method" => method_label(method),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("router_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}
