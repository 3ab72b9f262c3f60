//! Block-structured bitset container
//!
//! A [`BlockBitset`] splits its bit space into fixed-size chunks, one slot per
//! chunk. Slots hold reference-counted blocks or nothing at all; an absent slot
//! reads as all zeros. Duplicating a bitset only clones the slot handles, and
//! blocks are copied lazily the first time a shared block is written.

use std::fmt;
use std::sync::Arc;

use cowbits_core::{
    block_slot_count, locate_bit, BitAccess, BitsetError, Block, Result, DEFAULT_BLOCK_WORDS,
};
use tracing::trace;

use crate::cow::{allocate_slots, make_exclusive, release_slots, slot_block_mut, Slot};
use crate::{BitsetConfig, Ones};

/// Fixed-length bitset built from copy-on-write blocks of `W` words
pub struct BlockBitset<const W: usize = DEFAULT_BLOCK_WORDS> {
    /// Number of addressable bits
    pub(crate) bit_count: usize,
    /// One entry per block-sized chunk, `None` when the chunk is all zeros
    pub(crate) slots: Vec<Slot<W>>,
    pub(crate) config: BitsetConfig,
}

/// Bitset with the default block size
pub type Bitset = BlockBitset<DEFAULT_BLOCK_WORDS>;

impl<const W: usize> BlockBitset<W> {
    /// Number of bits covered by one block slot
    pub const BITS_PER_BLOCK: usize = Block::<W>::BITS;

    /// Create a bitset of `bit_count` bits, all 0
    pub fn new(bit_count: usize) -> Result<Self> {
        Self::with_config(bit_count, BitsetConfig::default())
    }

    /// Create a bitset of `bit_count` bits, all 0, with explicit configuration
    pub fn with_config(bit_count: usize, config: BitsetConfig) -> Result<Self> {
        if W == 0 {
            return Err(BitsetError::InvalidArgument(
                "block size must be at least one word",
            ));
        }

        let slot_count = block_slot_count(bit_count, Self::BITS_PER_BLOCK);
        let mut slots = allocate_slots(slot_count, &config)?;
        slots.resize(slot_count, None);

        trace!(bit_count, slot_count, "allocated bitset");
        Ok(Self {
            bit_count,
            slots,
            config,
        })
    }

    /// Create a bitset of `bit_count` bits with the given bits set
    pub fn from_ones<I>(bit_count: usize, ones: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut bitset = Self::new(bit_count)?;
        for index in ones {
            bitset.set(index)?;
        }
        Ok(bitset)
    }

    /// Create an independent copy that shares every block with `self`
    ///
    /// No bit content is copied; shared blocks are copied on the first write
    /// through either bitset.
    pub fn duplicate(&self) -> Result<Self> {
        let mut slots = allocate_slots(self.slots.len(), &self.config)?;
        slots.extend(self.slots.iter().cloned());

        Ok(Self {
            bit_count: self.bit_count,
            slots,
            config: self.config.clone(),
        })
    }

    /// Total number of addressable bits
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Number of block slots
    #[inline]
    pub fn block_slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of bits that are set
    pub fn population_count(&self) -> usize {
        self.blocks().map(|block| block.set_count()).sum()
    }

    /// Whether any bit is set
    pub fn any(&self) -> bool {
        self.blocks().any(|block| !block.is_empty())
    }

    /// Whether no bit is set
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Number of slots holding a block
    pub fn allocated_blocks(&self) -> usize {
        self.blocks().count()
    }

    /// Number of slots holding a block that is also held elsewhere
    pub fn shared_blocks(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|block| Arc::strong_count(*block) > 1)
            .count()
    }

    /// Get the configuration this bitset reports storage through
    pub fn config(&self) -> &BitsetConfig {
        &self.config
    }

    /// Iterate over the indices of set bits in ascending order
    pub fn iter_ones(&self) -> Ones<'_, W> {
        Ones::new(&self.slots)
    }

    fn blocks(&self) -> impl Iterator<Item = &Block<W>> + '_ {
        self.slots.iter().flatten().map(|block| block.block())
    }

    /// Check whether the bit at `index` is set
    pub fn test(&self, index: usize) -> Result<bool> {
        let (slot, bit) = locate_bit(index, self.bit_count, Self::BITS_PER_BLOCK)?;
        Ok(self.slots[slot]
            .as_ref()
            .is_some_and(|block| block.test(bit)))
    }

    /// Set the bit at `index` to 1
    ///
    /// Setting a bit that is already 1 allocates nothing.
    pub fn set(&mut self, index: usize) -> Result<()> {
        let (slot, bit) = locate_bit(index, self.bit_count, Self::BITS_PER_BLOCK)?;
        if self.slots[slot]
            .as_ref()
            .is_some_and(|block| block.test(bit))
        {
            return Ok(());
        }

        slot_block_mut(&mut self.slots[slot], &self.config)?.set(bit);
        Ok(())
    }

    /// Set the bit at `index` to 0
    ///
    /// Clearing a bit that is already 0 allocates nothing.
    pub fn clear(&mut self, index: usize) -> Result<()> {
        let (slot, bit) = locate_bit(index, self.bit_count, Self::BITS_PER_BLOCK)?;
        let Some(block) = &mut self.slots[slot] else {
            return Ok(());
        };
        if !block.test(bit) {
            return Ok(());
        }

        make_exclusive(block, &self.config)?.clear(bit);
        Ok(())
    }

    /// Flip the bit at `index`, returning its new value
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let (slot, bit) = locate_bit(index, self.bit_count, Self::BITS_PER_BLOCK)?;
        Ok(slot_block_mut(&mut self.slots[slot], &self.config)?.toggle(bit))
    }
}

impl<const W: usize> Drop for BlockBitset<W> {
    fn drop(&mut self) {
        // Blocks report to their own trackers as the handles go
        let slot_count = self.slots.len();
        self.slots.clear();
        release_slots::<W>(slot_count, &self.config);
    }
}

impl<const W: usize> PartialEq for BlockBitset<W> {
    fn eq(&self, other: &Self) -> bool {
        self.bit_count == other.bit_count
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|pair| match pair {
                    (None, None) => true,
                    (Some(block), None) | (None, Some(block)) => block.is_empty(),
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a.words() == b.words(),
                })
    }
}

impl<const W: usize> Eq for BlockBitset<W> {}

impl<const W: usize> fmt::Debug for BlockBitset<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBitset")
            .field("bit_count", &self.bit_count)
            .field("population", &self.population_count())
            .field("allocated_blocks", &self.allocated_blocks())
            .field("shared_blocks", &self.shared_blocks())
            .finish()
    }
}

impl<const W: usize> BitAccess for BlockBitset<W> {
    fn bit_count(&self) -> usize {
        self.bit_count
    }

    fn population_count(&self) -> usize {
        BlockBitset::population_count(self)
    }

    fn test(&self, index: usize) -> Result<bool> {
        BlockBitset::test(self, index)
    }
}
