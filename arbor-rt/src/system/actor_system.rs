//! The actor-system root object.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::debug;

// Layer 3: Internal module imports
use super::shared::SystemShared;
use crate::actor::UntypedRef;
use crate::error::ActorError;

/// Anchor of one supervision tree.
///
/// Holds the system map, the query correlation table, and the root guardian
/// that parents every top-level actor. Cloning is cheap and shares the same
/// system.
///
/// # Examples
///
/// ```rust,ignore
/// use arbor_rt::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), ActorError> {
///     let system = ActorSystem::new("app");
///     let counter = spawn(
///         &system,
///         |state: i64, message: i64, _ctx| async move { Ok(state + message) },
///         Props::new().with_initial_state(0),
///     )?;
///     counter.dispatch(1)?;
///     system.shutdown()?;
///     Ok(())
/// }
/// ```
pub struct ActorSystem {
    shared: Arc<SystemShared>,
}

impl ActorSystem {
    /// Create a named system with an empty tree.
    pub fn new(name: impl Into<String>) -> Self {
        let shared = SystemShared::new(name);
        debug!(system = %shared.name(), "actor system started");
        Self { shared }
    }

    /// The system's name; it prefixes every actor path.
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    /// Reference addressing the system root. Accepts no messages, but can be
    /// spawned under like any actor reference.
    pub fn root(&self) -> UntypedRef {
        self.shared.root_ref()
    }

    /// Number of live actors in the system map.
    pub fn actor_count(&self) -> usize {
        self.shared.actor_count()
    }

    /// Whether the system still accepts spawns.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Stop every top-level actor (and with them the whole tree) and refuse
    /// further spawns. Shutting down twice is a usage error.
    pub fn shutdown(&self) -> Result<(), ActorError> {
        if !self.shared.mark_stopped() {
            return Err(ActorError::SystemStopped);
        }
        for cell in self.shared.root_child_cells() {
            cell.stop();
        }
        debug!(system = %self.shared.name(), "actor system shut down");
        Ok(())
    }

    pub(crate) fn shared(&self) -> &Arc<SystemShared> {
        &self.shared
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new("system")
    }
}

impl Clone for ActorSystem {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.shared.name())
            .field("actors", &self.shared.actor_count())
            .finish()
    }
}
