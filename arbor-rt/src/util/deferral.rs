//! One-shot settle cell used for query correlation.
//!
//! A [`Deferral`] can be resolved or rejected exactly once; second and
//! subsequent settle calls are no-ops. The receiving half is an awaitable
//! handle held by the querying caller.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use crate::error::ActorError;

/// Single-assignment value cell with pending, resolved, and rejected states.
pub(crate) struct Deferral<T> {
    sender: Mutex<Option<oneshot::Sender<Result<T, ActorError>>>>,
}

/// The awaitable half of a [`Deferral`].
pub(crate) struct Settled<T> {
    receiver: oneshot::Receiver<Result<T, ActorError>>,
}

impl<T: Send + 'static> Deferral<T> {
    /// Create a pending deferral and its awaitable handle.
    pub(crate) fn new() -> (Self, Settled<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(sender)),
            },
            Settled { receiver },
        )
    }

    /// Settle with a value. Returns false if already settled.
    pub(crate) fn resolve(&self, value: T) -> bool {
        match self.sender.lock().take() {
            Some(sender) => sender.send(Ok(value)).is_ok(),
            None => false,
        }
    }

    /// Settle with an error. Returns false if already settled.
    pub(crate) fn reject(&self, error: ActorError) -> bool {
        match self.sender.lock().take() {
            Some(sender) => sender.send(Err(error)).is_ok(),
            None => false,
        }
    }
}

impl<T> Settled<T> {
    /// Wait for the deferral to settle.
    ///
    /// A deferral dropped without settling reports the system as gone; this
    /// only happens when the owning system is torn down mid-query.
    pub(crate) async fn wait(self) -> Result<T, ActorError> {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => Err(ActorError::SystemStopped),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_delivers_value() {
        let (deferral, settled) = Deferral::new();
        assert!(deferral.resolve(7));
        assert_eq!(settled.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_second_resolve_is_noop() {
        let (deferral, settled) = Deferral::new();
        assert!(deferral.resolve(1));
        assert!(!deferral.resolve(2));
        assert_eq!(settled.wait().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reject_delivers_error() {
        let (deferral, settled) = Deferral::<u32>::new();
        assert!(deferral.reject(ActorError::SystemStopped));
        assert!(matches!(
            settled.wait().await,
            Err(ActorError::SystemStopped)
        ));
    }

    #[tokio::test]
    async fn test_reject_after_resolve_is_noop() {
        let (deferral, settled) = Deferral::new();
        assert!(deferral.resolve(1));
        assert!(!deferral.reject(ActorError::SystemStopped));
        assert_eq!(settled.wait().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_unsettled_reports_system_gone() {
        let (deferral, settled) = Deferral::<u32>::new();
        drop(deferral);
        assert!(matches!(
            settled.wait().await,
            Err(ActorError::SystemStopped)
        ));
    }
}
