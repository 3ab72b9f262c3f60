//! Copy-on-write slot management
//!
//! A slot either holds a shared handle to a block or is absent, meaning every
//! bit in its range is 0. The helpers here are the only code that creates or
//! unshares blocks, so the storage tracker sees every change and no caller can
//! reach a `&mut Block` while the block is still shared.
//!
//! Each block remembers the tracker it was reserved from and reports itself
//! there when the last handle goes away. Whole-set operations hand blocks
//! between bitsets with different configurations, so the bitset that happens
//! to drop a block last is not necessarily the one that paid for it.

use std::fmt;
use std::mem::size_of;
use std::ops::Deref;
use std::sync::Arc;

use cowbits_core::{AllocKind, BitsetError, Block, Result, StorageTracker};
use tracing::{debug, trace};

use crate::BitsetConfig;

/// One block slot of a bitset
pub(crate) type Slot<const W: usize> = Option<Arc<TrackedBlock<W>>>;

/// A block together with the tracker its storage was reserved from
pub(crate) struct TrackedBlock<const W: usize> {
    block: Block<W>,
    tracker: Option<Arc<dyn StorageTracker>>,
}

impl<const W: usize> TrackedBlock<W> {
    /// Get the bit content
    #[inline]
    pub(crate) fn block(&self) -> &Block<W> {
        &self.block
    }
}

impl<const W: usize> Deref for TrackedBlock<W> {
    type Target = Block<W>;

    #[inline]
    fn deref(&self) -> &Block<W> {
        &self.block
    }
}

impl<const W: usize> Drop for TrackedBlock<W> {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.release(AllocKind::Block, Block::<W>::SIZE);
        }
    }
}

impl<const W: usize> fmt::Debug for TrackedBlock<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedBlock")
            .field("set_count", &self.block.set_count())
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}

/// Reserve and allocate an empty slot vector with room for `count` slots
pub(crate) fn allocate_slots<const W: usize>(
    count: usize,
    config: &BitsetConfig,
) -> Result<Vec<Slot<W>>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let bytes = count
        .checked_mul(size_of::<Slot<W>>())
        .ok_or(BitsetError::AllocationFailure)?;
    config.reserve(AllocKind::Slots, bytes)?;

    let mut slots = Vec::new();
    if slots.try_reserve_exact(count).is_err() {
        config.cancel(AllocKind::Slots, bytes);
        debug!(count, bytes, "slot vector allocation failed");
        return Err(BitsetError::AllocationFailure);
    }
    config.commit(AllocKind::Slots, bytes);
    Ok(slots)
}

/// Release the reservation for a slot vector of `count` slots
pub(crate) fn release_slots<const W: usize>(count: usize, config: &BitsetConfig) {
    if count > 0 {
        config.release(AllocKind::Slots, count * size_of::<Slot<W>>());
    }
}

/// Reserve and allocate a block initialized by `init`
pub(crate) fn new_block<const W: usize>(
    config: &BitsetConfig,
    init: impl FnOnce() -> Block<W>,
) -> Result<Arc<TrackedBlock<W>>> {
    config.reserve(AllocKind::Block, Block::<W>::SIZE)?;
    let block = Arc::new(TrackedBlock {
        block: init(),
        tracker: config.tracker().cloned(),
    });
    config.commit(AllocKind::Block, Block::<W>::SIZE);
    Ok(block)
}

/// Get write access to a block, first replacing it with a private copy if
/// any other slot holds it
///
/// The copy is reserved from `config`; the shared original stays charged to
/// its own tracker until its remaining owners drop it.
pub(crate) fn make_exclusive<'a, const W: usize>(
    block: &'a mut Arc<TrackedBlock<W>>,
    config: &BitsetConfig,
) -> Result<&'a mut Block<W>> {
    if Arc::get_mut(block).is_none() {
        let copy = new_block(config, || block.block().clone())?;
        trace!(
            owners = Arc::strong_count(block),
            set_count = copy.set_count(),
            "unsharing block before write"
        );
        *block = copy;
    }

    let exclusive = Arc::get_mut(block).expect("unshared block has a single owner");
    Ok(&mut exclusive.block)
}

/// Get write access to the block in `slot`, materializing an empty block if
/// the slot is absent
pub(crate) fn slot_block_mut<'a, const W: usize>(
    slot: &'a mut Slot<W>,
    config: &BitsetConfig,
) -> Result<&'a mut Block<W>> {
    let block = match slot.take() {
        Some(block) => block,
        None => {
            trace!("materializing empty block");
            new_block(config, Block::new)?
        }
    };
    make_exclusive(slot.insert(block), config)
}
