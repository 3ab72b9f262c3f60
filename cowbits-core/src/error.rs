//! Error types for bitset operations

use thiserror::Error;

/// Errors that can occur during bitset operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitsetError {
    /// Malformed call contract
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Bit index outside `[0, bit_count)`
    #[error("bit index {index} out of range for a bitset of {bit_count} bits")]
    OutOfRange { index: usize, bit_count: usize },
    /// Binary operation between bitsets of different lengths
    #[error("bitset size mismatch: {left} bits vs {right} bits")]
    SizeMismatch { left: usize, right: usize },
    /// Storage for a slot vector or block could not be obtained
    #[error("storage allocation failed")]
    AllocationFailure,
}

/// Broad classification of a [`BitsetError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCategory {
    /// The caller passed something the operation cannot accept
    Usage,
    /// Storage could not be obtained
    Resource,
}

impl BitsetError {
    /// Get the category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            BitsetError::InvalidArgument(_)
            | BitsetError::OutOfRange { .. }
            | BitsetError::SizeMismatch { .. } => ErrorCategory::Usage,
            BitsetError::AllocationFailure => ErrorCategory::Resource,
        }
    }
}

/// Result type for bitset operations
pub type Result<T> = core::result::Result<T, BitsetError>;
