//! # arbor-rt - In-Process Actor Runtime with Parent-Directed Supervision
//!
//! A supervision-tree scheduler in which isolated stateful entities
//! ("actors") communicate solely by asynchronous message passing, persist
//! state across messages, spawn and own children, and recover from faults
//! via parent-directed supervision.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use arbor_rt::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! enum CounterMsg {
//!     Add(i64),
//!     Get(ReplyRef<i64>),
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ActorError> {
//!     let system = ActorSystem::new("app");
//!
//!     let counter = spawn(
//!         &system,
//!         |state: i64, message: CounterMsg, _ctx| async move {
//!             match message {
//!                 CounterMsg::Add(delta) => Ok(state + delta),
//!                 CounterMsg::Get(reply) => {
//!                     reply.resolve(state);
//!                     Ok(state)
//!                 }
//!             }
//!         },
//!         Props::new().with_name("counter").with_initial_state(0),
//!     )?;
//!
//!     counter.dispatch(CounterMsg::Add(2))?;
//!     counter.dispatch(CounterMsg::Add(4))?;
//!     let total = counter
//!         .query(CounterMsg::Get, Duration::from_millis(100))
//!         .await?;
//!     assert_eq!(total, 6);
//!
//!     system.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! # Core Guarantees
//!
//! - **Serial execution**: at most one behavior invocation per actor is in
//!   flight at any time; messages are processed in strict dispatch order.
//! - **Parent-ordered lifecycle**: parents own their children; stopping a
//!   parent recursively stops every transitive descendant, and a stopping
//!   actor leaves its parent's children before its own children go down.
//! - **Fault propagation**: behavior failures never surface to the sender;
//!   they are routed to the actor's supervision policy, whose nine
//!   [`supervisor::Directive`] decisions stop, resume, reset, or escalate.
//! - **Queries**: request/reply round-trips with temporary reply references
//!   and mandatory, clamped timeouts.
//! - **Idle shutdown**: actors with a configured idle period stop themselves
//!   once their mailbox stays empty for that long.
//!
//! # Module Organization
//!
//! - [`actor`] - actor cells, contexts, references, props, spawn facades
//! - [`message`] - message trait and type-erased envelopes
//! - [`mailbox`] - FIFO mailbox
//! - [`supervisor`] - fault records, directives, supervision policies
//! - [`system`] - system root, system map, query correlation
//! - [`util`] - ids, settle cells, scheduling helpers
//!
//! # Non-Goals
//!
//! Distribution across processes, persistence of actor state across process
//! restarts, strict real-time scheduling, priority mailboxes, and send
//! back-pressure are out of scope. Mailboxes are unbounded.

pub mod actor;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod prelude;
pub mod supervisor;
pub mod system;
pub mod util;

// Re-export commonly used types
pub use actor::{
    spawn, spawn_stateless, ActorPath, ActorRef, Context, Props, SpawnRef, SupervisionContext,
    UntypedRef,
};
pub use error::{ActorError, BehaviorError, PanicFault};
pub use mailbox::Mailbox;
pub use message::{AnyMessage, Message};
pub use supervisor::{Directive, Fault};
pub use system::{ActorSystem, ReplyRef};
pub use util::{ActorId, TempId};
