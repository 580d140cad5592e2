//! Cooperative stop signal for a mirror run
//!
//! Network waits (renders, requests, backoff sleeps) race against the signal
//! and give up as soon as it fires. File writes never do: a write that has
//! started always finishes, so the run can be drained before its host
//! directory is removed.

use std::sync::Arc;
use tokio::sync::watch;

/// Shared flag telling every part of a run to wind down
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal; later calls are no-ops
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`stop`](StopSignal::stop) has been called
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let signal = StopSignal::new();
        assert!(!signal.is_stopped());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.stopped().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.stop();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stopped() did not resolve")
            .unwrap();
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_already_stopped_resolves_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        signal.stop();
        tokio::time::timeout(Duration::from_millis(100), signal.stopped())
            .await
            .expect("stopped() should not wait");
    }
}
