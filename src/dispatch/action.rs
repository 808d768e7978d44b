//! The middleware/handler seam.
//!
//! Every registered route carries one [`Action`]. Middleware and terminal
//! handlers share the same signature; a handler is simply an action that
//! does not resume the chain.

use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::dispatch::chain::Next;
use crate::error::HandlerResult;
use crate::http::Context;

/// A middleware or handler bound to a route.
///
/// Implementations receive the request context and a continuation. Calling
/// `next.run(ctx).await` enters the following match and resolves once that
/// nested chain has completed; code after it runs during unwinding.
pub trait Action: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult>;
}

impl<F> Action for F
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        self(ctx, next)
    }
}

/// Reference-counted action; cloning preserves identity.
pub type SharedAction = Arc<dyn Action>;

/// Box a closure as an action.
///
/// Passing the closure through this function lets the compiler infer the
/// higher-ranked signature:
///
/// ```ignore
/// let hello = from_fn(|ctx, _next| Box::pin(async move {
///     ctx.text("hello", ResponseInit::new());
///     Ok(())
/// }));
/// ```
pub fn from_fn<F>(f: F) -> SharedAction
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compare two actions by identity.
pub fn same_action(a: &SharedAction, b: &SharedAction) -> bool {
    Arc::ptr_eq(a, b)
}
