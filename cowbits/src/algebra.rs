//! Whole-set boolean algebra
//!
//! In-place operations walk the slots of `self` and `other` pairwise and
//! rewrite `self`. They keep the sparse representation: a slot that becomes
//! all zeros is released instead of holding an empty block, and a slot whose
//! block is entirely ones becomes absent on complement.
//!
//! Operand sizes are checked before any slot is touched. If a block
//! allocation fails part way through, `self` is left valid but only partially
//! combined; the allocating variants discard their copy in that case, so their
//! inputs are never affected.

use std::sync::Arc;

use cowbits_core::{slot_bit_len, validate_same_size, Block, Result};
use tracing::trace;

use crate::cow::{make_exclusive, new_block};
use crate::BlockBitset;

impl<const W: usize> BlockBitset<W> {
    /// `self |= other`
    pub fn or(&mut self, other: &Self) -> Result<()> {
        validate_same_size(self.bit_count, other.bit_count)?;

        for (slot, theirs) in self.slots.iter_mut().zip(&other.slots) {
            let Some(theirs) = theirs else {
                continue;
            };
            match slot {
                None => {
                    // Nothing to merge into, share their block as is. It
                    // stays charged to whichever tracker reserved it.
                    *slot = Some(Arc::clone(theirs));
                }
                Some(ours) => {
                    if Arc::ptr_eq(ours, theirs) {
                        continue;
                    }
                    make_exclusive(ours, &self.config)?.or(theirs);
                }
            }
        }
        Ok(())
    }

    /// `self &= other`
    pub fn and(&mut self, other: &Self) -> Result<()> {
        validate_same_size(self.bit_count, other.bit_count)?;

        for (slot, theirs) in self.slots.iter_mut().zip(&other.slots) {
            let Some(ours) = slot else {
                continue;
            };
            let Some(theirs) = theirs else {
                *slot = None;
                continue;
            };
            if Arc::ptr_eq(ours, theirs) {
                continue;
            }

            let block = make_exclusive(ours, &self.config)?;
            block.and(theirs);
            if block.is_empty() {
                *slot = None;
            }
        }
        Ok(())
    }

    /// `self &= !other`
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        validate_same_size(self.bit_count, other.bit_count)?;

        for (slot, theirs) in self.slots.iter_mut().zip(&other.slots) {
            let (Some(ours), Some(theirs)) = (slot.as_mut(), theirs) else {
                continue;
            };
            if Arc::ptr_eq(ours, theirs) {
                *slot = None;
                continue;
            }

            let block = make_exclusive(ours, &self.config)?;
            block.subtract(theirs);
            if block.is_empty() {
                *slot = None;
            }
        }
        Ok(())
    }

    /// `self = !self`
    ///
    /// Bits past `bit_count` in the final block stay 0.
    pub fn invert(&mut self) -> Result<()> {
        let bit_count = self.bit_count;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let len = slot_bit_len(index, bit_count, Self::BITS_PER_BLOCK);
            match slot {
                None => {
                    trace!(slot = index, len, "materializing full block");
                    *slot = Some(new_block(&self.config, || Block::filled(len))?);
                }
                Some(block) => {
                    if block.is_full(len) {
                        trace!(slot = index, "collapsing full block");
                        *slot = None;
                    } else {
                        make_exclusive(block, &self.config)?.invert(len);
                    }
                }
            }
        }
        Ok(())
    }

    /// Compute `self | other` as a new bitset
    pub fn union(&self, other: &Self) -> Result<Self> {
        validate_same_size(self.bit_count, other.bit_count)?;
        let mut result = self.duplicate()?;
        result.or(other)?;
        Ok(result)
    }

    /// Compute `self & other` as a new bitset
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        validate_same_size(self.bit_count, other.bit_count)?;
        let mut result = self.duplicate()?;
        result.and(other)?;
        Ok(result)
    }

    /// Compute `self & !other` as a new bitset
    pub fn difference(&self, other: &Self) -> Result<Self> {
        validate_same_size(self.bit_count, other.bit_count)?;
        let mut result = self.duplicate()?;
        result.subtract(other)?;
        Ok(result)
    }

    /// Compute `!self` as a new bitset
    pub fn inverse(&self) -> Result<Self> {
        let mut result = self.duplicate()?;
        result.invert()?;
        Ok(result)
    }
}
