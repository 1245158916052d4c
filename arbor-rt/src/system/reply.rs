//! Temporary reply references for the query pattern.

// Layer 1: Standard library imports
use std::fmt;
use std::marker::PhantomData;
use std::sync::Weak;

// Layer 2: Third-party crate imports
use tracing::warn;

// Layer 3: Internal module imports
use super::shared::SystemShared;
use crate::message::{AnyMessage, Message};
use crate::util::deferral::Deferral;
use crate::util::ids::TempId;

/// Type-erased settle handle stored in the temp-reference table, so that
/// queries with heterogeneous reply types share one table.
pub(crate) trait AnySettle: Send + Sync {
    fn resolve_any(&self, value: AnyMessage) -> bool;
}

impl<T: Message> AnySettle for Deferral<T> {
    fn resolve_any(&self, value: AnyMessage) -> bool {
        match value.downcast::<T>() {
            Some(value) => self.resolve(value),
            None => {
                warn!(
                    expected = std::any::type_name::<T>(),
                    received = value.type_name(),
                    "query reply with mismatched type dropped"
                );
                false
            }
        }
    }
}

/// Short-lived reference used as the reply address of one query.
///
/// Created by [`crate::actor::ActorRef::query`], registered with the system
/// before the query message is dispatched, and handed to the target inside
/// the message built by the query's factory. Resolving it completes the
/// caller's query; the registration is consumed by the first resolution (or
/// by the query's timeout), so later resolutions return `false`.
pub struct ReplyRef<R: Message> {
    id: TempId,
    system: Weak<SystemShared>,
    _marker: PhantomData<fn(R)>,
}

impl<R: Message> ReplyRef<R> {
    pub(crate) fn new(id: TempId, system: Weak<SystemShared>) -> Self {
        Self {
            id,
            system,
            _marker: PhantomData,
        }
    }

    /// The temp-reference id, for diagnostics.
    pub fn id(&self) -> TempId {
        self.id
    }

    /// Deliver the reply. Returns false if the query already completed,
    /// timed out, or the system is gone.
    pub fn resolve(&self, value: R) -> bool {
        let Some(system) = self.system.upgrade() else {
            return false;
        };
        match system.take_temp(self.id) {
            Some(settle) => settle.resolve_any(AnyMessage::new(value)),
            None => false,
        }
    }
}

impl<R: Message> Clone for ReplyRef<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            system: Weak::clone(&self.system),
            _marker: PhantomData,
        }
    }
}

impl<R: Message> fmt::Debug for ReplyRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplyRef({})", self.id)
    }
}
