//! Spawn facades: construct a new actor under a non-stopped parent.

// Layer 1: Standard library imports
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::FutureExt;
use tracing::{debug, error};

// Layer 3: Internal module imports
use super::actor_ref::{ActorRef, UntypedRef};
use super::behavior::erase_behavior;
use super::cell::{ActorCell, CellSpec, FaultOrigin, ParentLink};
use super::context::Context;
use super::props::Props;
use crate::error::{panic_to_error, ActorError, BehaviorError};
use crate::message::{AnyMessage, Message};
use crate::supervisor::policy::{escalate_policy, resume_policy};
use crate::system::shared::SystemShared;
use crate::system::ActorSystem;
use crate::util::ids::ActorId;
use crate::util::schedule;

/// A resolved spawn parent: the system root guardian or a live actor.
pub(crate) enum SpawnTarget {
    Root(Arc<SystemShared>),
    Cell(Arc<SystemShared>, Arc<ActorCell>),
}

mod sealed {
    use super::SpawnTarget;
    use crate::error::ActorError;

    pub trait Sealed {
        fn resolve(&self) -> Result<SpawnTarget, ActorError>;
    }
}

/// Anything an actor can be spawned under: the system itself or a reference
/// to a live actor. Sealed; resolution goes through the system-map guard.
pub trait SpawnRef: sealed::Sealed {}

impl sealed::Sealed for ActorSystem {
    fn resolve(&self) -> Result<SpawnTarget, ActorError> {
        if !self.shared().is_running() {
            return Err(ActorError::SystemStopped);
        }
        Ok(SpawnTarget::Root(Arc::clone(self.shared())))
    }
}

impl SpawnRef for ActorSystem {}

impl sealed::Sealed for UntypedRef {
    fn resolve(&self) -> Result<SpawnTarget, ActorError> {
        let system = self.upgrade()?;
        if self.id() == system.root_id() {
            if !system.is_running() {
                return Err(ActorError::SystemStopped);
            }
            return Ok(SpawnTarget::Root(system));
        }
        let cell = system.live_cell(self)?;
        Ok(SpawnTarget::Cell(system, cell))
    }
}

impl SpawnRef for UntypedRef {}

impl<M: Message> sealed::Sealed for ActorRef<M> {
    fn resolve(&self) -> Result<SpawnTarget, ActorError> {
        sealed::Sealed::resolve(&self.untyped())
    }
}

impl<M: Message> SpawnRef for ActorRef<M> {}

/// Spawn a stateful actor under `parent` and return its typed reference.
///
/// The behavior is invoked once per message, strictly serially, as
/// `behavior(state, message, context)`; its resolved value becomes the next
/// state. Behavior failures (errors and panics) are routed to the actor's
/// supervision policy, never to senders.
///
/// # Errors
///
/// Fails if the parent is stopped or gone, the name is invalid or collides
/// with a sibling, or no initial state was configured.
///
/// # Examples
///
/// ```rust,ignore
/// use arbor_rt::prelude::*;
///
/// let system = ActorSystem::new("app");
/// let counter = spawn(
///     &system,
///     |state: i64, message: i64, _ctx| async move { Ok(state + message) },
///     Props::new().with_name("counter").with_initial_state(0),
/// )?;
/// counter.dispatch(2)?;
/// ```
pub fn spawn<P, S, M, F, Fut>(
    parent: &P,
    behavior: F,
    props: Props<S>,
) -> Result<ActorRef<M>, ActorError>
where
    P: SpawnRef,
    S: Send + 'static,
    M: Message,
    F: Fn(S, M, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, BehaviorError>> + Send + 'static,
{
    let target = sealed::Sealed::resolve(parent)?;
    let (system, parent_link, parent_path, parent_ref) = match &target {
        SpawnTarget::Root(system) => (
            Arc::clone(system),
            ParentLink::Root,
            system.root_path().clone(),
            system.root_ref(),
        ),
        SpawnTarget::Cell(system, cell) => (
            Arc::clone(system),
            ParentLink::Cell(Arc::downgrade(cell)),
            cell.path().clone(),
            cell.untyped_ref(),
        ),
    };

    let Props {
        name,
        shutdown_after,
        on_crash,
        state_init,
        after_stop,
    } = props;

    // Unnamed actors take an opaque segment derived from their own id.
    let id = ActorId::new();
    let name = match name {
        Some(name) => validate_name(name)?,
        None => format!("anon-{}", id.short_token()),
    };
    let path = parent_path.child(name.clone());
    let state_init = state_init.ok_or_else(|| ActorError::MissingInitialState {
        path: path.clone(),
    })?;

    let cell = ActorCell::new(CellSpec {
        id,
        name,
        path: path.clone(),
        system: Arc::clone(&system),
        parent_link,
        parent_ref,
        behavior: erase_behavior(behavior),
        on_crash: on_crash.unwrap_or_else(escalate_policy),
        after_stop,
        init: Props::erase_init(state_init),
        shutdown_after,
    });

    match &target {
        SpawnTarget::Root(system) => system.root_child_spawned(&cell)?,
        SpawnTarget::Cell(_, parent_cell) => parent_cell.child_spawned(&cell)?,
    }
    system.register(&cell);
    debug!(path = %path, spawned_at = %cell.spawned_at(), "spawned actor");

    cell.start_init();
    cell.arm_initial_idle();
    Ok(ActorRef::from_untyped(cell.untyped_ref()))
}

/// Spawn a stateless actor: `function(message, context)` is scheduled
/// independently for each message, so slow handling does not delay the
/// mailbox.
///
/// Faults inside the independent execution are routed back to the owning
/// actor's fault path by looking the actor up through its self-reference;
/// the fixed stateless policy resumes. If the actor is no longer resident
/// when the fault is observed, an error fault is logged and a captured panic
/// is rethrown to the host task.
pub fn spawn_stateless<P, M, F, Fut>(
    parent: &P,
    function: F,
    props: Props<()>,
) -> Result<ActorRef<M>, ActorError>
where
    P: SpawnRef,
    M: Message,
    F: Fn(M, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BehaviorError>> + Send + 'static,
{
    let behavior = move |_state: (), message: M, ctx: Context| {
        let myself = ctx.myself().clone();
        let offending = AnyMessage::new(message.clone());
        let invocation = function(message, ctx);
        schedule::macrotask(async move {
            match AssertUnwindSafe(invocation).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(failure)) => {
                    route_stateless_fault(&myself, offending, Arc::new(failure)).await;
                }
                Err(payload) => match myself.resolve_cell() {
                    Some(cell) => {
                        let failure: Arc<BehaviorError> = Arc::new(panic_to_error(payload));
                        cell.handle_fault(Some(offending), failure, None, FaultOrigin::External)
                            .await;
                    }
                    None => std::panic::resume_unwind(payload),
                },
            }
        });
        std::future::ready(Ok(()))
    };

    let mut props = props;
    props.on_crash = Some(resume_policy());
    if props.state_init.is_none() {
        props = props.with_initial_state(());
    }
    spawn(parent, behavior, props)
}

async fn route_stateless_fault(
    myself: &UntypedRef,
    message: AnyMessage,
    failure: Arc<BehaviorError>,
) {
    match myself.resolve_cell() {
        Some(cell) => {
            cell.handle_fault(Some(message), failure, None, FaultOrigin::External)
                .await;
        }
        None => {
            error!(
                reference = ?myself,
                error = %failure,
                "stateless function fault for a non-resident actor"
            );
        }
    }
}

fn validate_name(name: String) -> Result<String, ActorError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(name)
    } else {
        Err(ActorError::InvalidName { name })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_plain_names() {
        assert_eq!(validate_name("worker-1".to_owned()).unwrap(), "worker-1");
        assert_eq!(validate_name("a_b.c".to_owned()).unwrap(), "a_b.c");
    }

    #[test]
    fn test_validate_name_rejects_separators_and_empty() {
        assert!(matches!(
            validate_name(String::new()),
            Err(ActorError::InvalidName { .. })
        ));
        assert!(matches!(
            validate_name("a/b".to_owned()),
            Err(ActorError::InvalidName { .. })
        ));
        assert!(matches!(
            validate_name("a b".to_owned()),
            Err(ActorError::InvalidName { .. })
        ));
    }
}
