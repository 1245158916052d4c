//! The actor core: cells, contexts, references, props, and spawn facades.

pub(crate) mod behavior;
pub(crate) mod cell;

mod actor_ref;
mod context;
mod path;
mod props;
mod spawn;

pub use actor_ref::{ActorRef, UntypedRef};
pub use behavior::{MessageTypeMismatch, StateTypeMismatch};
pub use context::{Context, SupervisionContext};
pub use path::ActorPath;
pub use props::Props;
pub use spawn::{spawn, spawn_stateless, SpawnRef};
