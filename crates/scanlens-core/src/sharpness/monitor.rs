//! Repeating, cancellable sharpness sampling.
//!
//! The loop runs as a tokio task. Each tick hands the capture and the
//! Laplacian computation to the blocking pool and waits for it before the
//! next tick is scheduled, so two computations never run at once. A tick that
//! falls behind is delayed rather than bursted.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::error::PipelineError;
use crate::frame::FrameSource;
use crate::types::SharpnessResult;

use super::SharpnessAnalyzer;

type Callback = Box<dyn FnMut(SharpnessResult) + Send + 'static>;

thread_local! {
    /// Address of the monitor whose callback is running on this thread, or 0.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

/// State shared between the sampling task and its handles.
struct Shared {
    cancelled: AtomicBool,
    callback: Mutex<Option<Callback>>,
    shutdown: Notify,
    delivered: AtomicU64,
}

impl Shared {
    fn new(callback: Callback) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            callback: Mutex::new(Some(callback)),
            shutdown: Notify::new(),
            delivered: AtomicU64::new(0),
        }
    }

    fn id(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Invoke the callback unless the monitor was cancelled.
    ///
    /// Returns false once the monitor is cancelled so the loop can exit.
    fn deliver(self: &Arc<Self>, result: SharpnessResult) -> bool {
        let mut slot = self
            .callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.is_cancelled() {
            slot.take();
            return false;
        }
        let Some(callback) = slot.as_mut() else {
            return false;
        };

        DELIVERING.with(|d| d.set(self.id()));
        callback(result);
        DELIVERING.with(|d| d.set(0));
        self.delivered.fetch_add(1, Ordering::SeqCst);

        // The callback may have cancelled the monitor itself.
        if self.is_cancelled() {
            slot.take();
            return false;
        }
        true
    }

    fn cancel(self: &Arc<Self>) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_one();

        let delivering = DELIVERING.with(|d| d.get());

        // Called from inside our own callback: the slot is already locked by
        // `deliver`, which drops the callback on return.
        if delivering == self.id() {
            return;
        }

        // Called from inside another monitor's callback. Waiting here could
        // deadlock two monitors cancelling each other, so a callback already
        // running on this monitor is left to finish and `deliver` drops it.
        if delivering != 0 {
            match self.callback.try_lock() {
                Ok(mut slot) => {
                    slot.take();
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    poisoned.into_inner().take();
                }
                Err(TryLockError::WouldBlock) => {}
            }
            return;
        }

        // Waits out an in-flight callback, so nothing is delivered after this.
        let mut slot = self
            .callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.take();
    }
}

/// Periodic focus sampler bound to one analyzer calibration and cadence.
#[derive(Debug, Clone)]
pub struct SharpnessMonitor {
    analyzer: SharpnessAnalyzer,
    interval: Duration,
}

impl SharpnessMonitor {
    /// Create a monitor that samples every `interval`.
    ///
    /// Fails with `UnsupportedConfig` when `interval` is zero.
    pub fn new(analyzer: SharpnessAnalyzer, interval: Duration) -> Result<Self, PipelineError> {
        if interval.is_zero() {
            return Err(PipelineError::unsupported_config(
                "monitor interval must be > 0",
            ));
        }
        Ok(Self { analyzer, interval })
    }

    /// Create a monitor from the `[sharpness]` and `[monitor]` sections.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        Self::new(
            SharpnessAnalyzer::new(config.sharpness.clone()),
            Duration::from_millis(config.monitor.interval_ms),
        )
    }

    /// Sampling cadence.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start sampling `source`, reporting every tick to `callback`.
    ///
    /// The first tick fires immediately. Must be called from within a tokio
    /// runtime. Dropping the returned handle stops the monitor.
    pub fn start<F>(&self, source: Arc<dyn FrameSource>, callback: F) -> MonitorHandle
    where
        F: FnMut(SharpnessResult) + Send + 'static,
    {
        let shared = Arc::new(Shared::new(Box::new(callback)));
        let task = tokio::spawn(run(
            Arc::clone(&shared),
            self.analyzer.clone(),
            source,
            self.interval,
        ));

        tracing::debug!("Sharpness monitor started ({:?} interval)", self.interval);
        MonitorHandle {
            shared,
            task: Some(task),
        }
    }
}

async fn run(
    shared: Arc<Shared>,
    analyzer: SharpnessAnalyzer,
    source: Arc<dyn FrameSource>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shared.shutdown.notified() => break,
            _ = ticker.tick() => {}
        }
        if shared.is_cancelled() {
            break;
        }

        let analyzer = analyzer.clone();
        let source = Arc::clone(&source);
        let result = match tokio::task::spawn_blocking(move || analyzer.sample(source.as_ref()))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Sharpness tick failed: {e}");
                SharpnessResult::unusable()
            }
        };

        tracing::trace!(
            "Sharpness tick: score={:.1} raw={:.1} quality={}",
            result.score,
            result.raw_measure,
            result.quality
        );

        if !shared.deliver(result) {
            break;
        }
    }

    tracing::debug!(
        "Sharpness monitor stopped after {} tick(s)",
        shared.delivered.load(Ordering::SeqCst)
    );
}

/// Owner of a running monitor.
///
/// Dropping the handle cancels the monitor.
pub struct MonitorHandle {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stop the monitor.
    ///
    /// Once this returns the callback is never invoked again. A computation
    /// already running on the blocking pool finishes, but its result is
    /// discarded.
    ///
    /// Called from inside another monitor's callback, this does not wait for
    /// a callback of this monitor that is already running.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Whether the monitor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Number of results delivered so far.
    pub fn delivered_ticks(&self) -> u64 {
        self.shared.delivered.load(Ordering::SeqCst)
    }

    /// A cloneable cancel switch, usable from inside the callback.
    pub fn canceller(&self) -> MonitorCanceller {
        MonitorCanceller {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Wait for the sampling loop to exit.
    ///
    /// The loop only exits after a cancel, so call [`cancel`](Self::cancel)
    /// first or hand a [`MonitorCanceller`] to whoever decides when to stop.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Sharpness monitor task ended abnormally: {e}");
            }
        }
    }

    /// Cancel and wait for the sampling loop to exit.
    pub async fn shutdown(self) {
        self.cancel();
        self.join().await;
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.shared.cancel();
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("cancelled", &self.is_cancelled())
            .field("delivered_ticks", &self.delivered_ticks())
            .finish()
    }
}

/// Cancels a monitor without owning it.
#[derive(Clone)]
pub struct MonitorCanceller {
    shared: Arc<Shared>,
}

impl MonitorCanceller {
    /// Stop the monitor. Same guarantee as [`MonitorHandle::cancel`].
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Whether the monitor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }
}

impl std::fmt::Debug for MonitorCanceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorCanceller")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
