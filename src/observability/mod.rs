//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and HTTP adapter produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (dispatch counters and latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the span created by the trace layer
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
