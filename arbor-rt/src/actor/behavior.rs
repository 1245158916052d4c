//! Type erasure at the behavior boundary.
//!
//! Users write typed closures over their own state and message types; the
//! cell stores erased functions over [`AnyMessage`] and boxed state. The
//! wrappers built here downcast on the way in and re-box on the way out.

// Layer 1: Standard library imports
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;
use thiserror::Error;

// Layer 3: Internal module imports
use super::context::Context;
use crate::error::BehaviorError;
use crate::message::{AnyMessage, Message};

/// Erased actor state. Exactly one live copy moves through each behavior
/// invocation.
pub(crate) type AnyState = Box<dyn Any + Send>;

pub(crate) type BehaviorResult = Result<AnyState, BehaviorError>;

/// Erased behavior: `(state, message, context) -> future<state>`.
pub(crate) type BehaviorFn =
    Arc<dyn Fn(AnyState, AnyMessage, Context) -> BoxFuture<'static, BehaviorResult> + Send + Sync>;

/// Erased state initializer.
pub(crate) type InitFn =
    Arc<dyn Fn(Context) -> BoxFuture<'static, BehaviorResult> + Send + Sync>;

/// Erased `after_stop` hook: final state (if any) plus a final context.
pub(crate) type AfterStopFn =
    Arc<dyn Fn(Option<AnyState>, Context) -> BoxFuture<'static, ()> + Send + Sync>;

/// A message reached a behavior expecting a different payload type.
///
/// Only possible through an [`crate::actor::UntypedRef`]; typed references
/// rule this out statically. Routed through supervision like any other
/// behavior fault.
#[derive(Debug, Error)]
#[error("message of type {received} cannot be handled by behavior expecting {expected}")]
pub struct MessageTypeMismatch {
    expected: &'static str,
    received: &'static str,
}

/// The state slot held a value of an unexpected type. Internal invariant
/// violation; surfaced as a fault rather than a crash.
#[derive(Debug, Error)]
#[error("actor state does not have the expected type {expected}")]
pub struct StateTypeMismatch {
    expected: &'static str,
}

/// Wrap a typed behavior closure into the cell's erased shape.
pub(crate) fn erase_behavior<S, M, F, Fut>(behavior: F) -> BehaviorFn
where
    S: Send + 'static,
    M: Message,
    F: Fn(S, M, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, BehaviorError>> + Send + 'static,
{
    Arc::new(move |state: AnyState, message: AnyMessage, ctx: Context| {
        let state = match state.downcast::<S>() {
            Ok(state) => *state,
            Err(_) => {
                return Box::pin(std::future::ready(Err(Box::new(StateTypeMismatch {
                    expected: std::any::type_name::<S>(),
                }) as BehaviorError)))
            }
        };
        let message = match message.downcast::<M>() {
            Some(message) => message,
            None => {
                let mismatch = MessageTypeMismatch {
                    expected: std::any::type_name::<M>(),
                    received: message.type_name(),
                };
                return Box::pin(std::future::ready(Err(Box::new(mismatch) as BehaviorError)));
            }
        };
        let future = behavior(state, message, ctx);
        Box::pin(async move {
            future
                .await
                .map(|next_state| Box::new(next_state) as AnyState)
        })
    })
}
