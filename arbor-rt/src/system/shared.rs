//! Process-wide shared state: the system map, the temp-reference table, and
//! the root guardian's child bookkeeping.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::reply::AnySettle;
use crate::actor::cell::ActorCell;
use crate::actor::{ActorPath, UntypedRef};
use crate::error::ActorError;
use crate::util::ids::{ActorId, TempId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemState {
    Running,
    Stopped,
}

#[derive(Default)]
struct RootChildren {
    cells: HashMap<String, Arc<ActorCell>>,
    refs: HashMap<String, UntypedRef>,
}

/// Shared core of one actor system.
///
/// The registry is the system map: the only way a reference becomes a live
/// actor. The temps table correlates query reply references with their
/// deferrals. Root children are the top level of the supervision tree.
pub(crate) struct SystemShared {
    name: String,
    root_id: ActorId,
    root_path: ActorPath,
    state: Mutex<SystemState>,
    registry: DashMap<ActorId, Arc<ActorCell>>,
    temps: DashMap<TempId, Arc<dyn AnySettle>>,
    root_children: Mutex<RootChildren>,
}

impl SystemShared {
    pub(crate) fn new(name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            root_id: ActorId::new(),
            root_path: ActorPath::root(name.clone()),
            name,
            state: Mutex::new(SystemState::Running),
            registry: DashMap::new(),
            temps: DashMap::new(),
            root_children: Mutex::new(RootChildren::default()),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn root_id(&self) -> ActorId {
        self.root_id
    }

    pub(crate) fn root_path(&self) -> &ActorPath {
        &self.root_path
    }

    pub(crate) fn root_ref(self: &Arc<Self>) -> UntypedRef {
        UntypedRef::new(self.root_id, self.root_path.clone(), Arc::downgrade(self))
    }

    pub(crate) fn is_running(&self) -> bool {
        *self.state.lock() == SystemState::Running
    }

    /// Flip to stopped. Returns false if the system was already stopped.
    pub(crate) fn mark_stopped(&self) -> bool {
        let mut state = self.state.lock();
        if *state == SystemState::Stopped {
            return false;
        }
        *state = SystemState::Stopped;
        true
    }

    // ------------------------------------------------------------------
    // System map (registry) and its guard
    // ------------------------------------------------------------------

    pub(crate) fn register(&self, cell: &Arc<ActorCell>) {
        self.registry.insert(cell.id(), Arc::clone(cell));
    }

    pub(crate) fn deregister(&self, id: ActorId) {
        self.registry.remove(&id);
    }

    pub(crate) fn cell(&self, id: ActorId) -> Option<Arc<ActorCell>> {
        self.registry.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// The atomic unit by which external code touches an actor: resolve the
    /// reference to a live actor and apply `f`, or fail with a well-defined
    /// error if the reference does not resolve or the actor is stopped.
    pub(crate) fn apply_or_stopped<T>(
        &self,
        reference: &UntypedRef,
        apply: impl FnOnce(&Arc<ActorCell>) -> T,
    ) -> Result<T, ActorError> {
        let cell = match self.cell(reference.id()) {
            Some(cell) => cell,
            None => {
                return Err(ActorError::NotFound {
                    path: reference.path().clone(),
                })
            }
        };
        if cell.is_stopped() {
            return Err(ActorError::Stopped {
                path: cell.path().clone(),
            });
        }
        Ok(apply(&cell))
    }

    /// Resolve a reference to its live cell.
    pub(crate) fn live_cell(&self, reference: &UntypedRef) -> Result<Arc<ActorCell>, ActorError> {
        self.apply_or_stopped(reference, Arc::clone)
    }

    /// Number of live actors in the system map.
    pub(crate) fn actor_count(&self) -> usize {
        self.registry.len()
    }

    // ------------------------------------------------------------------
    // Temp-reference table (query correlation)
    // ------------------------------------------------------------------

    pub(crate) fn add_temp(&self, id: TempId, settle: Arc<dyn AnySettle>) {
        self.temps.insert(id, settle);
    }

    /// Remove and return the settle handle. The atomic removal is what makes
    /// "deregistered exactly once" hold when a reply races a timeout.
    pub(crate) fn take_temp(&self, id: TempId) -> Option<Arc<dyn AnySettle>> {
        self.temps.remove(&id).map(|(_, settle)| settle)
    }

    pub(crate) fn remove_temp(&self, id: TempId) {
        self.temps.remove(&id);
    }

    // ------------------------------------------------------------------
    // Root guardian children
    // ------------------------------------------------------------------

    /// Register a top-level actor. Fails if the system has shut down or the
    /// name collides with a live sibling.
    pub(crate) fn root_child_spawned(&self, cell: &Arc<ActorCell>) -> Result<(), ActorError> {
        if !self.is_running() {
            return Err(ActorError::SystemStopped);
        }
        let mut root = self.root_children.lock();
        if root.cells.contains_key(cell.name()) {
            return Err(ActorError::DuplicateName {
                name: cell.name().to_owned(),
                parent: self.root_path.clone(),
            });
        }
        root.refs.insert(cell.name().to_owned(), cell.untyped_ref());
        root.cells.insert(cell.name().to_owned(), Arc::clone(cell));
        Ok(())
    }

    pub(crate) fn root_child_stopped(&self, name: &str) {
        let mut root = self.root_children.lock();
        root.cells.remove(name);
        root.refs.remove(name);
    }

    pub(crate) fn root_child_cells(&self) -> Vec<Arc<ActorCell>> {
        self.root_children
            .lock()
            .cells
            .values()
            .map(Arc::clone)
            .collect()
    }
}
