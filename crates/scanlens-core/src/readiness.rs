//! Explicit readiness gate for the enhancement backend.
//!
//! Callers that start enhancing right after construction await
//! [`Readiness::wait_until_ready`] instead of guessing a delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::PipelineError;

/// Shared ready flag. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct Readiness {
    tx: Arc<watch::Sender<bool>>,
}

impl Readiness {
    /// A gate that starts out not ready.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A gate that is already open.
    pub fn ready() -> Self {
        let gate = Self::new();
        gate.mark_ready();
        gate
    }

    /// Open the gate, waking every waiter.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the gate is open.
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate opens or `timeout` elapses.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), PipelineError> {
        let mut rx = self.tx.subscribe();
        let outcome = tokio::time::timeout(timeout, async {
            rx.wait_for(|ready| *ready).await.map(|_| ())
        })
        .await;
        match outcome {
            Ok(Ok(())) => Ok(()),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Ok(Err(_)) | Err(_) => Err(PipelineError::Timeout {
                stage: "readiness".to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
