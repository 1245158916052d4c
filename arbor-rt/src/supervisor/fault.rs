// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::error::BehaviorError;
use crate::message::{AnyMessage, Message};

/// A behavior fault as seen by supervision policies.
///
/// Carries the message that was being processed when the fault occurred
/// (absent for state-initialization faults), the error itself, and the time
/// the fault was raised. Escalation forwards the same fault up the tree
/// unchanged.
#[derive(Clone)]
pub struct Fault {
    message: Option<AnyMessage>,
    error: Arc<BehaviorError>,
    raised_at: DateTime<Utc>,
}

impl Fault {
    pub(crate) fn new(message: Option<AnyMessage>, error: Arc<BehaviorError>) -> Self {
        Self {
            message,
            error,
            raised_at: Utc::now(),
        }
    }

    /// The message being processed when the fault occurred, if any.
    pub fn message(&self) -> Option<&AnyMessage> {
        self.message.as_ref()
    }

    /// Recover an owned copy of the offending message, if it has the
    /// expected type.
    pub fn message_as<M: Message>(&self) -> Option<M> {
        self.message.as_ref().and_then(AnyMessage::downcast)
    }

    /// The error raised by the behavior.
    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &**self.error
    }

    /// When the fault was raised.
    pub fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("message", &self.message)
            .field("error", &self.error)
            .field("raised_at", &self.raised_at)
            .finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} (while processing {:?})", self.error, message),
            None => write!(f, "{} (during state initialization)", self.error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn boom() -> Arc<BehaviorError> {
        Arc::new("boom".into())
    }

    #[test]
    fn test_message_round_trip() {
        let fault = Fault::new(Some(AnyMessage::new(9_i64)), boom());
        assert_eq!(fault.message_as::<i64>(), Some(9));
        assert_eq!(fault.message_as::<String>(), None);
    }

    #[test]
    fn test_init_fault_has_no_message() {
        let fault = Fault::new(None, boom());
        assert!(fault.message().is_none());
        assert!(fault.to_string().contains("state initialization"));
    }

    #[test]
    fn test_display_includes_error() {
        let fault = Fault::new(Some(AnyMessage::new("kaboom")), boom());
        let rendered = fault.to_string();
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("kaboom"));
    }

    #[test]
    fn test_clone_shares_error() {
        let fault = Fault::new(None, boom());
        let cloned = fault.clone();
        assert_eq!(fault.error().to_string(), cloned.error().to_string());
        assert_eq!(fault.raised_at(), cloned.raised_at());
    }
}
