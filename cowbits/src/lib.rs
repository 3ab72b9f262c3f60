//! cowbits - sparse bitsets with copy-on-write block sharing
//!
//! A bitset is split into fixed-size blocks. All-zero blocks are not stored
//! at all, and blocks are shared between bitsets by reference count until one
//! of them writes, at which point only that block is copied. Duplicating a
//! bitset therefore costs one handle per block, whatever its content.
//!
//! ## Architecture
//!
//! - **cowbits-core**: the storage block, errors, bounds validation and the
//!   traits at the seams (no allocation)
//! - **cowbits**: the bitset container, copy-on-write slot management, set
//!   algebra and allocation statistics
//!
//! ## Quick Start
//!
//! ```rust
//! use cowbits::Bitset;
//!
//! fn example() -> cowbits::Result<()> {
//!     let mut visited = Bitset::new(200)?;
//!     visited.set(5)?;
//!     visited.set(130)?;
//!
//!     // Cheap snapshot, blocks are shared until written
//!     let mut snapshot = visited.duplicate()?;
//!     snapshot.clear(5)?;
//!     assert!(visited.test(5)?);
//!     assert!(!snapshot.test(5)?);
//!
//!     let either = visited.union(&snapshot)?;
//!     assert_eq!(either.population_count(), 2);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Instrumentation
//!
//! Storage is reported to an optional [`StorageTracker`] passed in through
//! [`BitsetConfig`]. [`AllocStats`] counts allocations and bytes and can
//! enforce a memory limit, which surfaces as
//! [`BitsetError::AllocationFailure`].

// Re-export core abstractions
pub use cowbits_core::{
    // Storage
    Block, DEFAULT_BLOCK_WORDS, WORD_BITS,
    // Traits
    AllocKind, BitAccess, StorageTracker,
    // Error handling
    BitsetError, ErrorCategory, Result,
};

mod algebra;
mod cow;

pub mod bitset;
pub mod config;
pub mod iter;
pub mod stats;

pub use bitset::{Bitset, BlockBitset};
pub use config::BitsetConfig;
pub use iter::Ones;
pub use stats::{AllocSnapshot, AllocStats};
