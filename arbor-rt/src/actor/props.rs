//! Actor construction properties.

// Layer 1: Standard library imports
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::behavior::{AfterStopFn, AnyState, InitFn};
use super::context::{Context, SupervisionContext};
use crate::error::BehaviorError;
use crate::supervisor::policy::{erase_policy, PolicyFn};
use crate::supervisor::{Directive, Fault};

/// Optional settings for a spawned actor.
///
/// `S` is the actor's state type. An actor must be given exactly one of an
/// initial state value or an initial state function; the two share a slot,
/// so setting one replaces the other.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use arbor_rt::prelude::*;
///
/// let props = Props::new()
///     .with_name("counter")
///     .with_initial_state(0_i64)
///     .with_shutdown_after(Duration::from_secs(30));
/// ```
pub struct Props<S> {
    pub(crate) name: Option<String>,
    pub(crate) shutdown_after: Option<Duration>,
    pub(crate) on_crash: Option<PolicyFn>,
    pub(crate) state_init: Option<StateInit<S>>,
    pub(crate) after_stop: Option<AfterStopFn>,
}

pub(crate) enum StateInit<S> {
    Value(Box<dyn Fn() -> S + Send + Sync>),
    Func(Box<dyn Fn(Context) -> BoxFuture<'static, Result<S, BehaviorError>> + Send + Sync>),
}

impl<S: Send + 'static> Props<S> {
    /// Empty properties: anonymous name, no idle shutdown, default
    /// (escalating) supervision, no initial state yet.
    pub fn new() -> Self {
        Self {
            name: None,
            shutdown_after: None,
            on_crash: None,
            state_init: None,
            after_stop: None,
        }
    }

    /// Name the actor. Must be unique among its parent's children; spawning
    /// fails on a collision. Unnamed actors get an opaque random token.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stop the actor after its mailbox has been empty for `period`.
    /// A new message arriving before the period elapses resets the window.
    /// Clamped like every timer duration.
    pub fn with_shutdown_after(mut self, period: Duration) -> Self {
        self.shutdown_after = Some(period);
        self
    }

    /// Supervision policy consulted when this actor (or a child escalating
    /// into it) faults. The default policy escalates.
    pub fn with_on_crash<F, Fut>(mut self, policy: F) -> Self
    where
        F: Fn(Fault, SupervisionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Directive> + Send + 'static,
    {
        self.on_crash = Some(erase_policy(policy));
        self
    }

    /// Initial state value. Re-cloned whenever initialization reruns after a
    /// reset, hence the `Clone` bound.
    pub fn with_initial_state(mut self, state: S) -> Self
    where
        S: Clone + Sync,
    {
        self.state_init = Some(StateInit::Value(Box::new(move || state.clone())));
        self
    }

    /// Initial state function, possibly async and fallible. Until its future
    /// resolves, no message is delivered to the behavior; a failure is
    /// routed through supervision.
    pub fn with_initial_state_fn<F, Fut>(mut self, init: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, BehaviorError>> + Send + 'static,
    {
        self.state_init = Some(StateInit::Func(Box::new(move |ctx| Box::pin(init(ctx)))));
        self
    }

    /// Hook run asynchronously after the actor stops, receiving the final
    /// state (absent if initialization never completed) and a final context
    /// snapshot. Failures are swallowed; the actor is already terminal.
    pub fn with_after_stop<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<S>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.after_stop = Some(Arc::new(move |state: Option<AnyState>, ctx: Context| {
            let state = state
                .and_then(|boxed| boxed.downcast::<S>().ok())
                .map(|boxed| *boxed);
            Box::pin(hook(state, ctx))
        }));
        self
    }

    /// Erase the state initializer into the cell's shape, if one was set.
    pub(crate) fn erase_init(state_init: StateInit<S>) -> InitFn {
        match state_init {
            StateInit::Value(factory) => {
                let factory = Arc::new(factory);
                Arc::new(move |_ctx: Context| {
                    let factory = Arc::clone(&factory);
                    Box::pin(async move { Ok(Box::new((*factory)()) as AnyState) })
                })
            }
            StateInit::Func(init) => {
                let init = Arc::new(init);
                Arc::new(move |ctx: Context| {
                    let init = Arc::clone(&init);
                    Box::pin(async move {
                        (*init)(ctx).await.map(|state| Box::new(state) as AnyState)
                    })
                })
            }
        }
    }
}

impl<S: Send + 'static> Default for Props<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_settings() {
        let props = Props::<i64>::new()
            .with_name("worker")
            .with_shutdown_after(Duration::from_millis(250))
            .with_initial_state(5);

        assert_eq!(props.name.as_deref(), Some("worker"));
        assert_eq!(props.shutdown_after, Some(Duration::from_millis(250)));
        assert!(props.state_init.is_some());
        assert!(props.on_crash.is_none());
        assert!(props.after_stop.is_none());
    }

    #[test]
    fn test_state_value_and_fn_share_one_slot() {
        let props = Props::<i64>::new()
            .with_initial_state(1)
            .with_initial_state_fn(|_ctx| async { Ok(2) });
        // The function replaced the value; exactly one initializer remains.
        assert!(matches!(props.state_init, Some(StateInit::Func(_))));
    }

    #[tokio::test]
    async fn test_value_init_reruns_from_clone() {
        let props = Props::<i64>::new().with_initial_state(7);
        let init = Props::erase_init(props.state_init.unwrap());
        let ctx = crate::actor::behavior::tests_support::null_context();
        let first = (*init)(ctx.clone()).await.unwrap();
        let second = (*init)(ctx).await.unwrap();
        assert_eq!(*first.downcast::<i64>().unwrap(), 7);
        assert_eq!(*second.downcast::<i64>().unwrap(), 7);
    }
}
