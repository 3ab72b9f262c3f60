//! Bit index and slot bounds validation
//!
//! Maps bit indices onto block slots and checks operand sizes before any
//! storage is touched.

use crate::BitsetError;

/// Validate that `index` addresses a bit of a bitset with `bit_count` bits
pub const fn validate_bit_index(index: usize, bit_count: usize) -> Result<(), BitsetError> {
    if index >= bit_count {
        return Err(BitsetError::OutOfRange { index, bit_count });
    }
    Ok(())
}

/// Validate an index and split it into `(slot, bit within block)`
pub const fn locate_bit(
    index: usize,
    bit_count: usize,
    bits_per_block: usize,
) -> Result<(usize, usize), BitsetError> {
    if let Err(err) = validate_bit_index(index, bit_count) {
        return Err(err);
    }
    Ok((index / bits_per_block, index % bits_per_block))
}

/// Validate that two bitsets can be combined
pub const fn validate_same_size(left: usize, right: usize) -> Result<(), BitsetError> {
    if left != right {
        return Err(BitsetError::SizeMismatch { left, right });
    }
    Ok(())
}

/// Number of block slots needed to hold `bit_count` bits
pub const fn block_slot_count(bit_count: usize, bits_per_block: usize) -> usize {
    bit_count.div_ceil(bits_per_block)
}

/// Number of addressable bits held by `slot`
///
/// Every slot is full except possibly the last one.
pub const fn slot_bit_len(slot: usize, bit_count: usize, bits_per_block: usize) -> usize {
    let start = slot * bits_per_block;
    let remaining = bit_count.saturating_sub(start);
    if remaining < bits_per_block {
        remaining
    } else {
        bits_per_block
    }
}
