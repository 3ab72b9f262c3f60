//! Fixed-capacity storage blocks
//!
//! A [`Block`] is the unit of storage and of sharing between bitsets. It
//! holds `W` 64-bit words and a cached population count. Blocks know nothing
//! about reference counts: ownership is carried by whatever handle a bitset
//! slot uses, and every mutating method here takes `&mut self`, so a block can
//! only be written through an exclusive handle.

use bytemuck::Zeroable;
use core::mem::size_of;

use crate::validation::validate_bit_index;
use crate::{BitAccess, Result};

/// Number of bits in one storage word
pub const WORD_BITS: usize = u64::BITS as usize;

/// Default number of words per block (4096 bits)
pub const DEFAULT_BLOCK_WORDS: usize = 64;

/// Fixed-size array of bits plus a cached population count
#[derive(Debug, Clone, PartialEq, Eq, Zeroable)]
pub struct Block<const W: usize = DEFAULT_BLOCK_WORDS> {
    /// Bit storage, bit `i` lives in `words[i / 64]` at position `i % 64`
    words: [u64; W],
    /// Number of 1-bits across `words`
    set_count: usize,
}

impl<const W: usize> Block<W> {
    /// Bit capacity of the block
    pub const BITS: usize = W * WORD_BITS;

    /// Size of the block in bytes, as reported to storage trackers
    pub const SIZE: usize = size_of::<Self>();

    /// Create an all-zero block
    pub fn new() -> Self {
        Self::zeroed()
    }

    /// Create a block whose first `len` bits are 1 and the rest 0
    pub fn filled(len: usize) -> Self {
        debug_assert!(len <= Self::BITS);

        let mut block = Self::zeroed();
        for (index, word) in block.words.iter_mut().enumerate() {
            *word = valid_mask(index, len);
        }
        block.set_count = len;
        block
    }

    /// Number of 1-bits in the block
    #[inline]
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    /// Whether no bit in the block is set
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set_count == 0
    }

    /// Whether all of the first `len` bits are set
    ///
    /// Bits past `len` are expected to be clear, which every bitset keeps true
    /// for its final, partially used block.
    #[inline]
    pub fn is_full(&self, len: usize) -> bool {
        self.set_count == len
    }

    /// Get the raw words
    pub fn words(&self) -> &[u64; W] {
        &self.words
    }

    /// Recount the 1-bits from the words, ignoring the cached count
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    fn locate(bit: usize) -> (usize, u64) {
        debug_assert!(bit < Self::BITS);
        (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
    }

    /// Check whether a bit is set
    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        self.words[word] & mask != 0
    }

    /// Set a bit that is currently clear
    #[inline]
    pub fn set(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        debug_assert!(self.words[word] & mask == 0, "bit {bit} already set");
        self.words[word] |= mask;
        self.set_count += 1;
    }

    /// Clear a bit that is currently set
    #[inline]
    pub fn clear(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        debug_assert!(self.words[word] & mask != 0, "bit {bit} already clear");
        self.words[word] &= !mask;
        self.set_count -= 1;
    }

    /// Flip a bit, returning its new value
    #[inline]
    pub fn toggle(&mut self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        self.words[word] ^= mask;

        let now_set = self.words[word] & mask != 0;
        if now_set {
            self.set_count += 1;
        } else {
            self.set_count -= 1;
        }
        now_set
    }

    /// `self |= other`
    pub fn or(&mut self, other: &Self) {
        self.combine(other, |a, b| a | b);
    }

    /// `self &= other`
    pub fn and(&mut self, other: &Self) {
        self.combine(other, |a, b| a & b);
    }

    /// `self &= !other`
    pub fn subtract(&mut self, other: &Self) {
        self.combine(other, |a, b| a & !b);
    }

    fn combine(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) {
        let mut count = 0;
        for (a, &b) in self.words.iter_mut().zip(other.words.iter()) {
            *a = op(*a, b);
            count += a.count_ones() as usize;
        }
        self.set_count = count;
    }

    /// Flip the first `len` bits, leaving the rest clear
    pub fn invert(&mut self, len: usize) {
        debug_assert!(len <= Self::BITS);
        debug_assert!(self.set_count <= len);

        for (index, word) in self.words.iter_mut().enumerate() {
            *word = !*word & valid_mask(index, len);
        }
        self.set_count = len - self.set_count;
    }
}

impl<const W: usize> Default for Block<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize> BitAccess for Block<W> {
    fn bit_count(&self) -> usize {
        Self::BITS
    }

    fn population_count(&self) -> usize {
        self.set_count
    }

    fn test(&self, index: usize) -> Result<bool> {
        validate_bit_index(index, Self::BITS)?;
        Ok(Block::test(self, index))
    }
}

/// Mask of the bits in word `word_index` that fall below `len`
pub const fn valid_mask(word_index: usize, len: usize) -> u64 {
    let start = word_index * WORD_BITS;
    if len >= start + WORD_BITS {
        u64::MAX
    } else if len <= start {
        0
    } else {
        (1u64 << (len - start)) - 1
    }
}
