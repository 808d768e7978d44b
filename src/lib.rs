//! Express-style HTTP routing with onion middleware.
//!
//! Routes are registered per method against path templates, every matching
//! route runs in registration order, and each action can wrap the rest of the
//! chain by awaiting its continuation.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use dispatch::{from_fn, Action, Next, SharedAction};
pub use error::{HandlerResult, PatternError, RouteError};
pub use http::{Context, HttpServer, Response, ResponseInit};
pub use routing::{Method, Router};
