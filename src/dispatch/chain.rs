//! The onion-style dispatch state machine.
//!
//! # State
//! ```text
//! entered = number of stack positions entered so far (0 = none)
//!
//! dispatch(i):
//!     i < entered          → DoubleContinuation
//!     entered = i + 1
//!     i == matches.len()   → chain exhausted, resolve
//!     ctx.params = matches[i].params            (entering scope)
//!     await matches[i].action(ctx, Next(i + 1))
//!     if i > 0: ctx.params = matches[i-1].params (unwinding scope)
//! ```
//!
//! # Design Decisions
//! - The continuation is a `Copy` value bound to one position; resuming a
//!   position twice is detected at runtime instead of being ignored
//! - The tail position is recorded before the exhaustion check, so a second
//!   `next` from the last action fails like any other repeated continuation
//!   instead of resolving as a no-op; resuming a position twice is always a
//!   programming error, wherever it sits in the stack
//! - Params are restored to the immediately enclosing frame on unwind,
//!   whether the nested chain succeeded or failed
//! - The engine introduces no suspension of its own and never catches
//!   handler errors

use futures_util::future::{self, BoxFuture};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{HandlerResult, RouteError};
use crate::http::Context;
use crate::routing::RouteMatch;

/// The ordered matches for one request plus the reentrancy guard.
#[derive(Debug)]
pub struct Chain {
    matches: Vec<RouteMatch>,
    entered: AtomicUsize,
}

impl Chain {
    pub fn new(matches: Vec<RouteMatch>) -> Self {
        Self {
            matches,
            entered: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[RouteMatch] {
        &self.matches
    }

    /// Run the whole chain from the outermost match.
    pub async fn run(&self, ctx: &mut Context) -> HandlerResult {
        self.dispatch(0, ctx).await
    }

    fn dispatch<'c>(&'c self, position: usize, ctx: &'c mut Context) -> BoxFuture<'c, HandlerResult> {
        // Entering is recorded when the continuation is invoked, not polled.
        let previous = self.entered.fetch_max(position + 1, Ordering::SeqCst);
        if position < previous {
            tracing::warn!(position, "Continuation invoked more than once");
            return Box::pin(future::ready(Err(RouteError::DoubleContinuation { position })));
        }

        let Some(current) = self.matches.get(position) else {
            return Box::pin(future::ready(Ok(())));
        };

        tracing::trace!(
            position,
            method = %current.route.method(),
            route = current.route.original(),
            "Entering route"
        );
        ctx.set_params(current.params.clone());

        Box::pin(async move {
            let next = Next {
                chain: self,
                position: position + 1,
            };
            let result = current.route.action().call(&mut *ctx, next).await;

            if position > 0 {
                ctx.set_params(self.matches[position - 1].params.clone());
            }
            result
        })
    }
}

/// Continuation handed to each action, bound to the following position.
#[derive(Debug, Clone, Copy)]
pub struct Next<'a> {
    chain: &'a Chain,
    position: usize,
}

impl<'a> Next<'a> {
    /// Enter the next match and resolve once the nested chain completes.
    pub fn run<'c>(&self, ctx: &'c mut Context) -> BoxFuture<'c, HandlerResult>
    where
        'a: 'c,
    {
        self.chain.dispatch(self.position, ctx)
    }

    /// Stack position this continuation resumes at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Matches still below this point in the stack.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.position)
    }
}
