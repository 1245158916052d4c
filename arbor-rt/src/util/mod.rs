//! Utilities: identifiers, one-shot settle cells, and scheduling helpers.

pub mod ids;

pub(crate) mod deferral;
pub(crate) mod schedule;

pub use ids::{ActorId, TempId};
