//! Execution context handed to behavior and policy code.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::ops::Deref;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::actor_ref::UntypedRef;
use super::path::ActorPath;

/// Snapshot of an actor's surroundings at one message boundary.
///
/// The children mapping is a copy taken when the context was built, so user
/// code mutating it cannot disturb the engine's bookkeeping. The mailbox
/// depth is likewise a point-in-time observation for inspection only.
#[derive(Debug, Clone)]
pub struct Context {
    myself: UntypedRef,
    parent: UntypedRef,
    path: ActorPath,
    name: String,
    children: HashMap<String, UntypedRef>,
    mailbox_len: usize,
}

impl Context {
    pub(crate) fn new(
        myself: UntypedRef,
        parent: UntypedRef,
        path: ActorPath,
        name: String,
        children: HashMap<String, UntypedRef>,
        mailbox_len: usize,
    ) -> Self {
        Self {
            myself,
            parent,
            path,
            name,
            children,
            mailbox_len,
        }
    }

    /// This actor's own reference.
    pub fn myself(&self) -> &UntypedRef {
        &self.myself
    }

    /// The parent's reference. For top-level actors this addresses the
    /// system root, which accepts no messages.
    pub fn parent(&self) -> &UntypedRef {
        &self.parent
    }

    /// This actor's path.
    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// This actor's name, unique among its parent's children.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the children mapping (name to reference).
    pub fn children(&self) -> &HashMap<String, UntypedRef> {
        &self.children
    }

    /// Look up one child by name.
    pub fn child(&self, name: &str) -> Option<&UntypedRef> {
        self.children.get(name)
    }

    /// Pending mailbox depth when this context was built.
    pub fn mailbox_len(&self) -> usize {
        self.mailbox_len
    }
}

/// A [`Context`] augmented with the child involved in a fault, handed to
/// supervision policies.
#[derive(Debug, Clone)]
pub struct SupervisionContext {
    context: Context,
    child: Option<UntypedRef>,
}

impl SupervisionContext {
    pub(crate) fn new(context: Context, child: Option<UntypedRef>) -> Self {
        Self { context, child }
    }

    /// The child whose fault escalated into this actor, if the fault came
    /// from a child rather than from this actor's own behavior.
    pub fn child(&self) -> Option<&UntypedRef> {
        self.child.as_ref()
    }
}

impl Deref for SupervisionContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.context
    }
}
