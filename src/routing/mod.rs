//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     template string
//!     → pattern.rs (tokenize, compile to anchored regex)
//!     → route.rs (method + pattern + action, appended to the table)
//!
//! Incoming Request (method, url):
//!     → matcher.rs (normalize url, test every route in order)
//!     → Return: ordered Vec<RouteMatch>, possibly empty
//!
//! Composition:
//!     router.rs mount(prefix, child)
//!     → child routes re-compiled under prefix, appended to parent
//! ```
//!
//! # Design Decisions
//! - Every matching route runs, not just the first
//! - Deterministic: same table and input always yield the same sequence
//! - Tables are append-only; nothing is sorted or deduplicated

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod router;

pub use matcher::{match_route, match_routes, normalize_url, Params, RouteMatch, PLACEHOLDER_ORIGIN};
pub use pattern::{ParamName, ParamToken, Pattern, PatternOptions, Token};
pub use route::{join_paths, Method, ParseMethodError, Route, RouteTable};
pub use router::{RouteBuilder, Router};
