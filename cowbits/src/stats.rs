//! Allocation statistics
//!
//! [`AllocStats`] is the stock [`StorageTracker`]. It counts every allocation
//! the way process-wide allocation counters would, but lives wherever the
//! caller puts it, and can optionally cap the live bytes it allows.
//!
//! Live bytes are held from `reserve` so the limit also covers allocations in
//! flight. The cumulative counters only move on `commit`.

use std::sync::atomic::{AtomicUsize, Ordering};

use cowbits_core::{AllocKind, BitsetError, Result, StorageTracker};

/// Counting storage tracker with an optional memory limit
#[derive(Debug, Default)]
pub struct AllocStats {
    allocations: AtomicUsize,
    bytes_allocated: AtomicUsize,
    live_bytes: AtomicUsize,
    live_blocks: AtomicUsize,
    memory_limit: Option<usize>,
}

/// Point-in-time copy of [`AllocStats`] counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocSnapshot {
    /// Total allocations that went through
    pub allocations: usize,
    /// Total bytes of allocations that went through
    pub bytes_allocated: usize,
    /// Bytes currently reserved or allocated and not yet released
    pub live_bytes: usize,
    /// Blocks currently allocated and not yet released
    pub live_blocks: usize,
}

impl AllocStats {
    /// Create a tracker with no memory limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse reservations that would take live bytes above `limit_bytes`
    pub fn with_memory_limit(mut self, limit_bytes: usize) -> Self {
        self.memory_limit = Some(limit_bytes);
        self
    }

    /// Get the memory limit, if any
    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    /// Read the current counters
    pub fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocations: self.allocations.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Acquire),
            live_blocks: self.live_blocks.load(Ordering::Relaxed),
        }
    }
}

impl StorageTracker for AllocStats {
    fn reserve(&self, _kind: AllocKind, bytes: usize) -> Result<()> {
        match self.memory_limit {
            Some(limit) => {
                self.live_bytes
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                        live.checked_add(bytes).filter(|&total| total <= limit)
                    })
                    .map_err(|_| BitsetError::AllocationFailure)?;
            }
            None => {
                self.live_bytes.fetch_add(bytes, Ordering::AcqRel);
            }
        }
        Ok(())
    }

    fn commit(&self, kind: AllocKind, bytes: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated.fetch_add(bytes, Ordering::Relaxed);
        if kind == AllocKind::Block {
            self.live_blocks.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn cancel(&self, _kind: AllocKind, bytes: usize) {
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
    }

    fn release(&self, kind: AllocKind, bytes: usize) {
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
        if kind == AllocKind::Block {
            self.live_blocks.fetch_sub(1, Ordering::Relaxed);
        }
    }
}
