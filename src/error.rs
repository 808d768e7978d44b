//! Error taxonomy for routing and dispatch.
//!
//! # Design Decisions
//! - "No route matched" is not an error; dispatch returns `Ok(None)`
//! - Handler errors are boxed so actions can fail with any error type
//! - The engine never swallows a handler error; enclosing middleware
//!   may recover by inspecting the result of `next.run(ctx)`

use thiserror::Error;

/// Boxed error produced by application handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by every middleware and handler.
pub type HandlerResult = Result<(), RouteError>;

/// Errors surfaced by the dispatch engine.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The continuation for `position` was invoked more than once.
    #[error("next() called multiple times (stack position {position})")]
    DoubleContinuation { position: usize },

    /// A registered middleware or handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// A template could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The request URL could not be normalized.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RouteError {
    /// Wrap any error raised by application code.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RouteError::Handler(err.into())
    }

    /// True for the programming error of resuming a stack position twice.
    pub fn is_double_continuation(&self) -> bool {
        matches!(self, RouteError::DoubleContinuation { .. })
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        RouteError::Handler(Box::new(err))
    }
}

/// Failure to compile a path template.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("unbalanced '(' at offset {offset} in template {template:?}")]
    UnclosedGroup { template: String, offset: usize },

    #[error("unexpected ')' at offset {offset} in template {template:?}")]
    UnexpectedClose { template: String, offset: usize },

    #[error("capturing groups are not allowed inside a parameter pattern (offset {offset} in {template:?})")]
    NestedGroup { template: String, offset: usize },

    #[error("empty parameter pattern at offset {offset} in template {template:?}")]
    EmptyGroup { template: String, offset: usize },

    #[error("host-qualified template {template:?} cannot be mounted under a prefix")]
    HostQualifiedMount { template: String },

    #[error("invalid regular expression for template {template:?}: {source}")]
    Regex {
        template: String,
        #[source]
        source: regex::Error,
    },
}
