//! Status sink abstraction for decoupled presentation.
//!
//! The poller publishes through a trait so that the monitor can run without
//! any particular UI and be tested headless.

use std::sync::{Arc, Mutex};

use crate::StatusUpdate;

/// Receives status updates from the poller.
///
/// Called only when the status text or icon changed, after the tick has
/// finished computing its state.
pub trait StatusSink: Send + Sync {
    fn publish(&self, update: &StatusUpdate);
}

/// Type alias for shared sink reference.
pub type StatusSinkRef = Arc<dyn StatusSink>;

/// In-memory sink for testing.
///
/// Captures all published updates for later inspection.
#[derive(Default)]
pub struct InMemoryStatusSink {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl InMemoryStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.lock().clone()
    }

    /// Status texts in publication order.
    pub fn texts(&self) -> Vec<String> {
        self.lock().iter().map(|u| u.status_text.clone()).collect()
    }

    pub fn last(&self) -> Option<StatusUpdate> {
        self.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StatusUpdate>> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatusSink for InMemoryStatusSink {
    fn publish(&self, update: &StatusUpdate) {
        self.lock().push(update.clone());
    }
}

/// Writes every update to the log. Used by the console daemon.
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn publish(&self, update: &StatusUpdate) {
        tracing::info!(icon = %update.icon, "status: {}", update.status_text);
    }
}

/// No-op sink that discards all updates.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn publish(&self, _update: &StatusUpdate) {}
}
