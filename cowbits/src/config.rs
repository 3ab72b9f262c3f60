//! Bitset configuration

use std::fmt;
use std::sync::Arc;

use cowbits_core::{AllocKind, Result, StorageTracker};
use tracing::debug;

/// Configuration shared by a bitset and every duplicate made from it
#[derive(Clone, Default)]
pub struct BitsetConfig {
    /// Receives every slot vector and block reservation made by the bitset
    tracker: Option<Arc<dyn StorageTracker>>,
}

impl BitsetConfig {
    /// Report storage to `tracker`
    pub fn with_tracker(mut self, tracker: Arc<dyn StorageTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Get the configured tracker, if any
    pub fn tracker(&self) -> Option<&Arc<dyn StorageTracker>> {
        self.tracker.as_ref()
    }

    pub(crate) fn reserve(&self, kind: AllocKind, bytes: usize) -> Result<()> {
        let Some(tracker) = &self.tracker else {
            return Ok(());
        };
        tracker.reserve(kind, bytes).inspect_err(|err| {
            debug!(
                ?kind,
                bytes,
                category = ?err.category(),
                "storage reservation refused"
            );
        })
    }

    pub(crate) fn commit(&self, kind: AllocKind, bytes: usize) {
        if let Some(tracker) = &self.tracker {
            tracker.commit(kind, bytes);
        }
    }

    pub(crate) fn cancel(&self, kind: AllocKind, bytes: usize) {
        if let Some(tracker) = &self.tracker {
            tracker.cancel(kind, bytes);
        }
    }

    pub(crate) fn release(&self, kind: AllocKind, bytes: usize) {
        if let Some(tracker) = &self.tracker {
            tracker.release(kind, bytes);
        }
    }
}

impl fmt::Debug for BitsetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitsetConfig")
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}
