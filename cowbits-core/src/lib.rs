#![no_std]

//! cowbits core - block storage and shared definitions
//!
//! This crate provides the storage block, error taxonomy, bounds validation
//! and the traits used by copy-on-write bitset containers. It performs no
//! allocation of its own.

pub mod block;
pub mod error;
pub mod traits;
pub mod validation;

pub use block::{valid_mask, Block, DEFAULT_BLOCK_WORDS, WORD_BITS};
pub use error::*;
pub use traits::*;
pub use validation::*;
