//! Macrotask scheduling and one-shot timers.
//!
//! A macrotask is a tokio task: it yields to the host reactor between runs,
//! so timers and external events interleave with message processing. This is
//! the suspension granularity of the engine. Cancellation is
//! [`tokio::task::JoinHandle::abort`]; an aborted, not-yet-run task never
//! executes.

// Layer 1: Standard library imports
use std::future::Future;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::task::JoinHandle;
use tokio::time::sleep;

// Layer 3: Internal module imports
// (none)

/// Longest schedulable delay, in milliseconds.
pub(crate) const MAX_DELAY_MS: u64 = 2_147_483_647;

/// Clamp a timer duration to the schedulable range.
///
/// Sub-millisecond fractions are truncated toward zero and the result is
/// capped at [`MAX_DELAY_MS`]. Negative and non-finite durations are
/// unrepresentable in [`Duration`], so the lower clamp is zero by type.
pub(crate) fn clamp_delay(delay: Duration) -> Duration {
    let millis = u64::try_from(delay.as_millis()).unwrap_or(MAX_DELAY_MS);
    Duration::from_millis(millis.min(MAX_DELAY_MS))
}

/// Run a closure on a later cooperative turn.
pub(crate) fn macrotask<F>(future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future)
}

/// Schedule a one-shot wake after the clamped delay.
pub(crate) fn after<F>(delay: Duration, future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let delay = clamp_delay(delay);
    tokio::spawn(async move {
        sleep(delay).await;
        future.await;
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_clamp_truncates_fractions() {
        assert_eq!(
            clamp_delay(Duration::from_micros(1_500)),
            Duration::from_millis(1)
        );
        assert_eq!(clamp_delay(Duration::from_micros(900)), Duration::ZERO);
    }

    #[test]
    fn test_clamp_caps_at_max() {
        assert_eq!(
            clamp_delay(Duration::from_secs(u64::MAX / 1_000)),
            Duration::from_millis(MAX_DELAY_MS)
        );
        assert_eq!(
            clamp_delay(Duration::from_millis(MAX_DELAY_MS)),
            Duration::from_millis(MAX_DELAY_MS)
        );
    }

    #[test]
    fn test_clamp_zero() {
        assert_eq!(clamp_delay(Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once_delay_elapses() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = after(Duration::from_millis(50), async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_abort_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = after(Duration::from_millis(50), async move {
            flag.store(true, Ordering::SeqCst);
        });
        handle.abort();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_macrotask_runs_on_later_turn() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = macrotask(async move {
            flag.store(true, Ordering::SeqCst);
        });
        // Not run inline; completes on a later cooperative turn.
        handle.await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }
}
