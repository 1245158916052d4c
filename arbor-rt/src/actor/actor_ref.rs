//! Addressable actor handles.
//!
//! A reference is an opaque handle resolved to a live actor through the
//! system map at use time. [`UntypedRef`] accepts any message type (the
//! receiving behavior faults on a mismatch); [`ActorRef`] is the typed facade
//! returned by `spawn`.

// Layer 1: Standard library imports
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::cell::ActorCell;
use super::path::ActorPath;
use crate::error::ActorError;
use crate::message::{AnyMessage, Message};
use crate::system::reply::{AnySettle, ReplyRef};
use crate::system::shared::SystemShared;
use crate::util::deferral::Deferral;
use crate::util::ids::{ActorId, TempId};
use crate::util::schedule;

/// Reference to an actor of unknown message type.
#[derive(Clone)]
pub struct UntypedRef {
    id: ActorId,
    path: ActorPath,
    system: Weak<SystemShared>,
}

impl UntypedRef {
    pub(crate) fn new(id: ActorId, path: ActorPath, system: Weak<SystemShared>) -> Self {
        Self { id, path, system }
    }

    /// The referenced actor's id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The referenced actor's path.
    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// Fire-and-forget send. Delivery is not acknowledgement of processing;
    /// an `Ok` means the message was accepted into the actor's mailbox turn.
    pub fn dispatch<M: Message>(&self, message: M) -> Result<(), ActorError> {
        self.dispatch_any(AnyMessage::new(message))
    }

    pub(crate) fn dispatch_any(&self, message: AnyMessage) -> Result<(), ActorError> {
        let system = self.upgrade()?;
        let cell = system.live_cell(self)?;
        cell.dispatch(message)
    }

    /// Stop the referenced actor. Stopping an already-stopped actor is a
    /// usage error.
    pub fn stop(&self) -> Result<(), ActorError> {
        let system = self.upgrade()?;
        let cell = system.live_cell(self)?;
        cell.stop();
        Ok(())
    }

    /// Whether the reference currently resolves to a non-stopped actor.
    pub fn is_live(&self) -> bool {
        match self.system.upgrade() {
            Some(system) => system.live_cell(self).is_ok(),
            None => false,
        }
    }

    /// Reinterpret as a typed reference. Messages of the wrong type fault
    /// the receiving behavior rather than the sender.
    pub fn typed<M: Message>(&self) -> ActorRef<M> {
        ActorRef {
            inner: self.clone(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn upgrade(&self) -> Result<Arc<SystemShared>, ActorError> {
        self.system.upgrade().ok_or(ActorError::SystemStopped)
    }

    pub(crate) fn resolve_cell(&self) -> Option<Arc<ActorCell>> {
        self.system.upgrade().and_then(|system| system.cell(self.id))
    }
}

impl fmt::Debug for UntypedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UntypedRef({})", self.path)
    }
}

impl PartialEq for UntypedRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UntypedRef {}

impl std::hash::Hash for UntypedRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Typed reference to an actor handling messages of type `M`.
pub struct ActorRef<M: Message> {
    inner: UntypedRef,
    _marker: PhantomData<fn(M) -> M>,
}

impl<M: Message> ActorRef<M> {
    pub(crate) fn from_untyped(inner: UntypedRef) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// The referenced actor's id.
    pub fn id(&self) -> ActorId {
        self.inner.id()
    }

    /// The referenced actor's path.
    pub fn path(&self) -> &ActorPath {
        self.inner.path()
    }

    /// Fire-and-forget send.
    pub fn dispatch(&self, message: M) -> Result<(), ActorError> {
        self.inner.dispatch_any(AnyMessage::new(message))
    }

    /// Request/reply round-trip.
    ///
    /// Creates a temporary reply reference scoped to the system, registers it
    /// *before* dispatching, builds the outgoing message via `factory`, and
    /// waits for some handler to resolve the reply. Times out with
    /// [`ActorError::QueryTimeout`] after the clamped `timeout`; timing out
    /// does not cancel in-flight work on the target. The temporary reference
    /// is deregistered exactly once, on settle or on timeout.
    pub async fn query<R, F>(&self, factory: F, timeout: Duration) -> Result<R, ActorError>
    where
        R: Message,
        F: FnOnce(ReplyRef<R>) -> M,
    {
        let system = self.inner.upgrade()?;
        // Fail loudly before registering anything if the target is gone.
        system.live_cell(&self.inner)?;

        let timeout = schedule::clamp_delay(timeout);
        let (deferral, settled) = Deferral::<R>::new();
        let deferral = Arc::new(deferral);
        let temp = TempId::new();
        system.add_temp(temp, Arc::clone(&deferral) as Arc<dyn AnySettle>);

        let reply = ReplyRef::new(temp, Arc::downgrade(&system));
        let message = AnyMessage::new(factory(reply));
        if let Err(error) = self.inner.dispatch_any(message) {
            system.remove_temp(temp);
            return Err(error);
        }

        // On expiry the timer deregisters the temp reference and rejects the
        // deferral; settling first makes the rejection a no-op.
        let timer = {
            let system = Arc::clone(&system);
            let deferral = Arc::clone(&deferral);
            schedule::after(timeout, async move {
                system.remove_temp(temp);
                deferral.reject(ActorError::QueryTimeout { timeout });
            })
        };

        let result = settled.wait().await;
        timer.abort();
        system.remove_temp(temp);
        result
    }

    /// Stop the referenced actor.
    pub fn stop(&self) -> Result<(), ActorError> {
        self.inner.stop()
    }

    /// Whether the reference currently resolves to a non-stopped actor.
    pub fn is_live(&self) -> bool {
        self.inner.is_live()
    }

    /// Drop the message-type information.
    pub fn untyped(&self) -> UntypedRef {
        self.inner.clone()
    }
}

impl<M: Message> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Message> fmt::Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({})", self.inner.path)
    }
}

impl<M: Message> From<ActorRef<M>> for UntypedRef {
    fn from(reference: ActorRef<M>) -> Self {
        reference.inner
    }
}

impl<M: Message> PartialEq for ActorRef<M> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<M: Message> Eq for ActorRef<M> {}
