//! Cancellation primitive for in-flight executions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cloneable handle that cancels a running execution.
///
/// Cancellation is cooperative: the executor checks the flag at wave
/// boundaries and signals in-flight node tasks through the notifier.
/// Already-collected results stay valid.
#[derive(Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    /// Creates a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes waiters.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves when cancellation is requested. Returns immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        // Re-check after registering to close the store/notify race.
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());

        let waiter = handle.clone();
        let task = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(task.await.expect("join"));
    }

    #[tokio::test]
    async fn test_already_cancelled_resolves_immediately() {
        let handle = CancelHandle::new();
        handle.cancel();
        handle.cancelled().await;
    }
}
