//! Iteration over set bits

use std::iter::FusedIterator;

use cowbits_core::{Block, WORD_BITS};

use crate::cow::{Slot, TrackedBlock};

/// Ascending iterator over the indices of set bits
///
/// Absent and empty slots are skipped without scanning their words.
#[derive(Debug, Clone)]
pub struct Ones<'a, const W: usize> {
    slots: &'a [Slot<W>],
    /// Next slot to look at once the current block is exhausted
    next_slot: usize,
    /// Block being scanned and its slot index
    block: Option<(usize, &'a Block<W>)>,
    /// Index of `current` within the block
    word: usize,
    /// Unvisited set bits of the current word
    current: u64,
}

impl<'a, const W: usize> Ones<'a, W> {
    pub(crate) fn new(slots: &'a [Slot<W>]) -> Self {
        Self {
            slots,
            next_slot: 0,
            block: None,
            word: 0,
            current: 0,
        }
    }

    fn advance_block(&mut self) -> Option<()> {
        let start = self.next_slot;
        let (slot, block) = self.slots[start..]
            .iter()
            .enumerate()
            .find_map(|(offset, slot)| {
                slot.as_deref()
                    .map(TrackedBlock::block)
                    .filter(|block| !block.is_empty())
                    .map(|block| (start + offset, block))
            })?;

        self.next_slot = slot + 1;
        self.block = Some((slot, block));
        self.word = 0;
        self.current = block.words()[0];
        Some(())
    }
}

impl<const W: usize> Iterator for Ones<'_, W> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                let (slot, _) = self.block?;
                return Some((slot * W + self.word) * WORD_BITS + bit);
            }

            match self.block {
                Some((_, block)) if self.word + 1 < W => {
                    self.word += 1;
                    self.current = block.words()[self.word];
                }
                _ => {
                    if self.advance_block().is_none() {
                        self.next_slot = self.slots.len();
                        self.block = None;
                        return None;
                    }
                }
            }
        }
    }
}

impl<const W: usize> FusedIterator for Ones<'_, W> {}
