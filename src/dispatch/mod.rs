//! Dispatch engine.
//!
//! # Data Flow
//! ```text
//! Vec<RouteMatch> (from routing)
//!     → chain.rs (Chain, position-bound Next continuations)
//!     → action.rs (each match's middleware/handler invoked once)
//!     → Context left holding the final response
//! ```
//!
//! # Design Decisions
//! - Middleware and handlers share one signature
//! - Strict nesting: post-`next` code runs in reverse entry order
//! - Errors propagate outward unchanged; recovery is a middleware concern

pub mod action;
pub mod chain;

pub use action::{from_fn, same_action, Action, SharedAction};
pub use chain::{Chain, Next};
