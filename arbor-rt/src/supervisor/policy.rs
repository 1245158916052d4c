//! Supervision policy plumbing.
//!
//! A policy is an async function from a fault and its supervision context to
//! a [`Directive`]. Policies are stored type-erased on the actor cell; the
//! built-in defaults are escalation (regular actors) and resumption
//! (stateless actors).

// Layer 1: Standard library imports
use std::future::{ready, Future};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::directive::Directive;
use super::fault::Fault;
use crate::actor::SupervisionContext;

/// Type-erased supervision policy.
pub(crate) type PolicyFn =
    Arc<dyn Fn(Fault, SupervisionContext) -> BoxFuture<'static, Directive> + Send + Sync>;

/// Erase a user-supplied policy closure.
pub(crate) fn erase_policy<F, Fut>(policy: F) -> PolicyFn
where
    F: Fn(Fault, SupervisionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Directive> + Send + 'static,
{
    Arc::new(move |fault, ctx| Box::pin(policy(fault, ctx)))
}

/// The library default: delegate every fault to the parent.
pub(crate) fn escalate_policy() -> PolicyFn {
    erase_policy(|_fault, _ctx| ready(Directive::Escalate))
}

/// Fixed policy for stateless actors: there is no state to protect, so
/// keep draining messages.
pub(crate) fn resume_policy() -> PolicyFn {
    erase_policy(|_fault, _ctx| ready(Directive::Resume))
}
