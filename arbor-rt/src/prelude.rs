//! Prelude module for convenient imports.
//!
//! Re-exports the types and functions most programs need:
//!
//! ```rust
//! use arbor_rt::prelude::*;
//! ```

// Core actor surface
pub use crate::actor::{
    spawn, spawn_stateless, ActorPath, ActorRef, Context, Props, SupervisionContext, UntypedRef,
};

// Errors
pub use crate::error::{ActorError, BehaviorError};

// Messaging
pub use crate::message::{AnyMessage, Message};

// Supervision
pub use crate::supervisor::{Directive, Fault};

// System
pub use crate::system::{ActorSystem, ReplyRef};
