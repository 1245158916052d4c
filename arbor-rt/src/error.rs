//! Crate-level error taxonomy.
//!
//! Two kinds of failure flow through the runtime and they never mix:
//!
//! - [`ActorError`] — the engine's own errors: usage errors (dispatching to a
//!   stopped actor, duplicate child names), reference-resolution failures, and
//!   query timeouts. These surface at the call site.
//! - [`BehaviorError`] — opaque faults raised by user behavior code. These
//!   never surface to the dispatcher; they follow the supervision tree only.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::ActorPath;

/// Opaque error raised by user-supplied behavior, initialization, or
/// stateless functions. Routed through supervision, never to the sender.
pub type BehaviorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the actor engine itself.
#[derive(Error, Debug)]
pub enum ActorError {
    /// The referenced actor has been stopped; no further work is accepted.
    #[error("actor at {path} is stopped")]
    Stopped { path: ActorPath },

    /// The reference no longer maps to a live actor in the system map.
    #[error("no live actor for reference {path}")]
    NotFound { path: ActorPath },

    /// A sibling with the same name already exists under the parent.
    #[error("a child named '{name}' already exists under {parent}")]
    DuplicateName { name: String, parent: ActorPath },

    /// The supplied actor name is empty or contains reserved characters.
    #[error("invalid actor name '{name}'")]
    InvalidName { name: String },

    /// The actor was spawned without an initial state or state function.
    #[error("actor at {path} was spawned without an initial state")]
    MissingInitialState { path: ActorPath },

    /// A query received no reply within its timeout window.
    #[error("query timed out after {timeout:?}")]
    QueryTimeout { timeout: Duration },

    /// The owning actor system has been shut down or dropped.
    #[error("actor system has been shut down")]
    SystemStopped,
}

impl ActorError {
    /// Check if the error is a caller-side usage error (programmer bug).
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ActorError::Stopped { .. }
                | ActorError::DuplicateName { .. }
                | ActorError::InvalidName { .. }
                | ActorError::MissingInitialState { .. }
        )
    }

    /// Check if the error is a query timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActorError::QueryTimeout { .. })
    }
}

/// A captured panic from behavior, initialization, or policy code.
///
/// Panics are converted into ordinary behavior faults so that supervision
/// sees one uniform fault shape.
#[derive(Debug)]
pub struct PanicFault {
    message: String,
}

impl PanicFault {
    /// The panic payload rendered as text, when it carried one.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "behavior panicked: {}", self.message)
    }
}

impl std::error::Error for PanicFault {}

/// Convert a caught panic payload into a [`BehaviorError`].
pub(crate) fn panic_to_error(payload: Box<dyn Any + Send>) -> BehaviorError {
    let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_owned()
    };
    Box::new(PanicFault { message })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn path() -> ActorPath {
        ActorPath::root("test").child("worker")
    }

    #[test]
    fn test_stopped_display() {
        let err = ActorError::Stopped { path: path() };
        assert!(err.to_string().contains("is stopped"));
        assert!(err.to_string().contains("worker"));
    }

    #[test]
    fn test_duplicate_name_mentions_name() {
        let err = ActorError::DuplicateName {
            name: "x".to_owned(),
            parent: ActorPath::root("test"),
        };
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_query_timeout_mentions_value() {
        let err = ActorError::QueryTimeout {
            timeout: Duration::from_millis(10),
        };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_usage_classification() {
        assert!(ActorError::Stopped { path: path() }.is_usage());
        assert!(ActorError::InvalidName {
            name: "a/b".to_owned()
        }
        .is_usage());
        assert!(!ActorError::SystemStopped.is_usage());
        assert!(!ActorError::NotFound { path: path() }.is_usage());
    }

    #[test]
    fn test_timeout_classification() {
        let err = ActorError::QueryTimeout {
            timeout: Duration::from_secs(1),
        };
        assert!(err.is_timeout());
        assert!(!err.is_usage());
    }

    #[test]
    fn test_panic_payload_str() {
        let err = panic_to_error(Box::new("boom"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_panic_payload_string() {
        let err = panic_to_error(Box::new("kapow".to_owned()));
        assert!(err.to_string().contains("kapow"));
    }

    #[test]
    fn test_panic_payload_opaque() {
        let err = panic_to_error(Box::new(42_u32));
        assert!(err.to_string().contains("non-string"));
    }
}
