//! Index and size validation for bitset operations
//!
//! This module contains pure functions with no allocation. All functions are
//! arithmetic on bit counts, block capacities and indices.

pub mod bounds;

pub use bounds::{
    block_slot_count, locate_bit, slot_bit_len, validate_bit_index, validate_same_size,
};
