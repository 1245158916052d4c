//! System root, system map, and query correlation.

mod actor_system;

pub(crate) mod reply;
pub(crate) mod shared;

pub use actor_system::ActorSystem;
pub use reply::ReplyRef;
