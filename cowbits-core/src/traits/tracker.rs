//! Storage instrumentation interface
//!
//! Bitset containers report every slot vector and block they allocate or
//! free to an optional tracker. A tracker may also refuse a reservation, which
//! surfaces to the caller as [`crate::BitsetError::AllocationFailure`].
//!
//! Each allocation goes through two steps: [`StorageTracker::reserve`] before
//! the memory is requested, then [`StorageTracker::commit`] once it exists or
//! [`StorageTracker::cancel`] if the allocation failed. Committed storage is
//! later handed back with [`StorageTracker::release`].

use crate::Result;

/// Kind of storage being reserved or released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocKind {
    /// The slot vector of a bitset
    Slots,
    /// A storage block
    Block,
}

/// Observer (and optional gatekeeper) of bitset storage
///
/// Storage is always released to the tracker that reserved it, even when a
/// block has since been shared with bitsets configured with other trackers.
pub trait StorageTracker: Send + Sync {
    /// Called before `bytes` of `kind` storage are allocated
    ///
    /// Returning an error aborts the allocation.
    fn reserve(&self, kind: AllocKind, bytes: usize) -> Result<()>;

    /// Called after a reserved allocation succeeded
    fn commit(&self, kind: AllocKind, bytes: usize);

    /// Called when a reserved allocation could not be made after all
    fn cancel(&self, kind: AllocKind, bytes: usize);

    /// Called after committed storage is freed
    fn release(&self, kind: AllocKind, bytes: usize);
}
