// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cooperative cancellation for timeline playback.
//!
//! [`CancellationToken::cancel_all`] raises a shared flag and bumps a
//! generation counter. The flag clears itself after a quiescence window, but
//! only if no newer cancellation arrived in the meantime, so overlapping
//! cancellations never clear each other early.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default time a cancellation stays raised
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(100);

/// Snapshot of the cancellation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CancelState {
    /// Whether playback should stop
    pub cancelled: bool,
    /// Number of cancellations raised so far
    pub generation: u64,
}

struct Inner {
    state: Mutex<CancelState>,
    /// Carries the generation so waiters wake on every cancellation
    generation_tx: watch::Sender<u64>,
    quiescence: Duration,
}

/// Shared cancellation flag; clones observe the same state
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Create a token with the default quiescence window
    pub fn new() -> Self {
        Self::with_quiescence(DEFAULT_QUIESCENCE)
    }

    /// Create a token whose flag clears `quiescence` after the last cancellation
    pub fn with_quiescence(quiescence: Duration) -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CancelState::default()),
                generation_tx,
                quiescence,
            }),
        }
    }

    /// Raise the flag and schedule it to clear after the quiescence window.
    ///
    /// Returns the new generation. Outside a tokio runtime nothing is scheduled
    /// and the flag stays raised until [`Self::reset_if_current`] is called.
    pub fn cancel_all(&self) -> u64 {
        let generation = {
            let mut state = self.inner.state.lock();
            state.cancelled = true;
            state.generation += 1;
            state.generation
        };
        self.inner.generation_tx.send_replace(generation);
        tracing::debug!(generation, "Cancelling camera animations");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let token = self.clone();
                let deadline = tokio::time::Instant::now() + self.inner.quiescence;
                handle.spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    token.reset_if_current(generation);
                });
            }
            Err(_) => {
                tracing::warn!(generation, "No async runtime, cancellation will not clear itself");
            }
        }

        generation
    }

    /// Clear the flag if `generation` is still the latest cancellation.
    ///
    /// Returns whether the flag was cleared.
    pub fn reset_if_current(&self, generation: u64) -> bool {
        let mut state = self.inner.state.lock();
        if state.generation == generation && state.cancelled {
            state.cancelled = false;
            tracing::trace!(generation, "Cancellation cleared");
            true
        } else {
            false
        }
    }

    /// Whether playback should stop
    pub fn is_cancelled(&self) -> bool {
        self.inner.state.lock().cancelled
    }

    /// Latest cancellation generation
    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// Current flag and generation
    pub fn state(&self) -> CancelState {
        *self.inner.state.lock()
    }

    /// Resolve once the flag is raised, immediately if it already is
    pub async fn cancelled(&self) {
        let mut generation_rx = self.inner.generation_tx.subscribe();
        if self.is_cancelled() {
            return;
        }
        // The sender lives as long as `self`, so this only returns on a change
        let _ = generation_rx.changed().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("state", &self.state())
            .field("quiescence", &self.inner.quiescence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_manual_reset_without_runtime() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let first = token.cancel_all();
        let second = token.cancel_all();
        assert_eq!((first, second), (1, 2));
        assert!(token.is_cancelled());

        // A stale reset must not clear a newer cancellation
        assert!(!token.reset_if_current(first));
        assert!(token.is_cancelled());
        assert!(token.reset_if_current(second));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel_all();
        assert!(clone.is_cancelled());
        assert_eq!(clone.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flag_clears_after_quiescence() {
        let token = CancellationToken::new();
        token.cancel_all();
        assert!(token.is_cancelled());

        sleep(Duration::from_millis(50)).await;
        assert!(token.is_cancelled());

        sleep(Duration::from_millis(60)).await;
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cancellations_debounce() {
        let token = CancellationToken::new();
        token.cancel_all();
        sleep(Duration::from_millis(60)).await;
        token.cancel_all();

        // The first reset fires at 100 ms but the second cancellation owns the flag
        sleep(Duration::from_millis(90)).await;
        assert!(token.is_cancelled());

        sleep(Duration::from_millis(20)).await;
        assert!(!token.is_cancelled());
        assert_eq!(token.state(), CancelState { cancelled: false, generation: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_future_wakes() {
        let token = CancellationToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        token.cancel_all();
        waiter.await.unwrap();
    }
}
