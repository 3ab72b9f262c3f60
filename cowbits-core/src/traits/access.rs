//! Read access to a sequence of bits

use crate::Result;

/// Format-agnostic read access to a fixed-length sequence of bits
pub trait BitAccess {
    /// Total number of addressable bits
    fn bit_count(&self) -> usize;

    /// Number of bits that are set
    fn population_count(&self) -> usize;

    /// Check whether the bit at `index` is set
    ///
    /// Fails with [`crate::BitsetError::OutOfRange`] when `index` is not
    /// below [`BitAccess::bit_count`].
    fn test(&self, index: usize) -> Result<bool>;
}
