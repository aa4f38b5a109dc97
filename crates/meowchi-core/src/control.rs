//! Shutdown control shared between the runner and the host.
//!
//! The host (signal handler, presentation layer, tests) holds an
//! `Arc<RunControl>` and calls [`RunControl::request_stop`]; the runner loop
//! waits on [`RunControl::stopped`] alongside its timers and exits after a
//! final save.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::Notify;

/// Why the runner loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunEndReason {
    /// [`RunControl::request_stop`] was called.
    StopRequested,
    /// Every [`crate::RunnerHandle`] was dropped.
    HandlesDropped,
}

/// Stop flag plus a wakeup for the runner loop.
#[derive(Debug, Default)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the runner when a stop is requested.
    stop_notify: Notify,
}

impl RunControl {
    /// Fresh control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean stop. Idempotent.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    ///
    /// Returns immediately if one already was.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }
}
