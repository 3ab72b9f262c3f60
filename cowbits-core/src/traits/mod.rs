//! Abstract interfaces for bitset storage
//!
//! This module defines the trait abstractions shared between the storage
//! layer and bitset containers. Traits are pure interfaces; the stock
//! implementations live in the `cowbits` crate.

pub mod access;
pub mod tracker;

pub use access::BitAccess;
pub use tracker::{AllocKind, StorageTracker};
