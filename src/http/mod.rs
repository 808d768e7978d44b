//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeouts)
//!     → request.rs (absolute request URL)
//!     → Router::dispatch (routing + dispatch engine)
//!     → context.rs (actions read params, write the response)
//!     → response.rs (finalized response converted for Axum)
//!     → Send to client
//! ```

pub mod context;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use context::Context;
pub use headers::{merge_headers, HeaderRule};
pub use request::{request_id_middleware, request_url, RequestId, X_REQUEST_ID};
pub use response::{finalize, Body, Payload, Response, ResponseInit};
pub use server::HttpServer;
