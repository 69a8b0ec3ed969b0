//! # dupsketch-core
//!
//! Core primitives shared by the dupsketch crates.
//!
//! Provides:
//! - The error type used across the workspace
//! - The parameterized hash family over the `2^31 - 1` universe
//! - Content-addressed shingle hashing (xxh3)

pub mod error;
pub mod hashing;

pub use error::{DupsketchError, Result};
pub use hashing::{shingle_code, HashFamily, HashParams, DEFAULT_SEED, UNIVERSE_SIZE};
