//! Shared utilities.
//!
//! Hashing and lenient version parsing used across the crate.

pub mod hash;
pub mod version;
