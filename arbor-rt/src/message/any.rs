//! Type-erased message envelope.
//!
//! Mailboxes and fault records are heterogeneous: a parent supervises
//! children of arbitrary message types, so messages travel internally as
//! [`AnyMessage`] and are downcast back at the behavior boundary.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::traits::Message;

/// Internal object-safe view of a message: `Any` for downcasting plus a
/// `Debug` passthrough so erased messages still log usefully.
trait DynMessage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn type_name(&self) -> &'static str;
}

impl<M: Message> DynMessage for M {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }
}

/// A cheaply cloneable, type-erased message.
#[derive(Clone)]
pub struct AnyMessage {
    inner: Arc<dyn DynMessage>,
}

impl AnyMessage {
    /// Erase a typed message.
    pub fn new<M: Message>(message: M) -> Self {
        Self {
            inner: Arc::new(message),
        }
    }

    /// Recover an owned copy of the payload, if it has the expected type.
    pub fn downcast<M: Message>(&self) -> Option<M> {
        self.inner.as_any().downcast_ref::<M>().cloned()
    }

    /// Borrow the payload, if it has the expected type.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.inner.as_any().downcast_ref::<M>()
    }

    /// The payload's type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }
}

impl fmt::Debug for AnyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_debug(f)
    }
}
