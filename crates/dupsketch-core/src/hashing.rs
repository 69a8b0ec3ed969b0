//! Hashing functions.
//!
//! Two layers feed a MinHash sketch: [`shingle_code`] turns a shingle string
//! into an integer, and [`HashFamily`] maps that integer through a set of
//! independent functions bounded to [`UNIVERSE_SIZE`].

use crate::error::{DupsketchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mersenne prime `2^31 - 1`. Every hash value lies in `[0, UNIVERSE_SIZE]`.
pub const UNIVERSE_SIZE: u64 = 2_147_483_647;

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// Hash a shingle to the integer code consumed by a [`HashFamily`].
///
/// Content-addressed (xxh3), so codes are identical across runs and machines.
#[inline]
#[must_use]
pub fn shingle_code(shingle: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(shingle.as_bytes())
}

/// Parameters `(a, b, c)` of one hash function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    /// Multiplier for the high bits of the input.
    pub a: u64,
    /// Multiplier for the full input.
    pub b: u64,
    /// Additive offset.
    pub c: u64,
}

impl HashParams {
    /// Draw a triple uniformly from `[0, UNIVERSE_SIZE]`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(0..=UNIVERSE_SIZE),
            b: rng.gen_range(0..=UNIVERSE_SIZE),
            c: rng.gen_range(0..=UNIVERSE_SIZE),
        }
    }

    /// Evaluate `(a * (x >> 4) + b * x + c) & UNIVERSE_SIZE` on the masked input.
    ///
    /// All operands are below `2^31` after masking, so the sum stays below
    /// `2^63` and never wraps. The arithmetic is unsigned, so the result is
    /// already its own absolute value.
    #[inline]
    #[must_use]
    pub fn apply(&self, x: u64) -> u64 {
        let x = x & UNIVERSE_SIZE;
        (self.a * (x >> 4) + self.b * x + self.c) & UNIVERSE_SIZE
    }
}

/// A reproducible family of hash functions over `[0, UNIVERSE_SIZE]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashFamily {
    params: Vec<HashParams>,
}

impl HashFamily {
    /// Create a family of `num_hash_functions` functions using [`DEFAULT_SEED`].
    pub fn new(num_hash_functions: usize) -> Result<Self> {
        Self::with_seed(num_hash_functions, DEFAULT_SEED)
    }

    /// Create a family seeded from `seed`.
    pub fn with_seed(num_hash_functions: usize, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_rng(num_hash_functions, &mut rng)
    }

    /// Create a family drawing its parameters from a caller-supplied source.
    pub fn from_rng<R: Rng>(num_hash_functions: usize, rng: &mut R) -> Result<Self> {
        if num_hash_functions == 0 {
            return Err(DupsketchError::config(
                "number of hash functions must be positive, got 0",
            ));
        }

        let params = (0..num_hash_functions)
            .map(|_| HashParams::random(rng))
            .collect();

        Ok(Self { params })
    }

    /// Number of functions in the family.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Always false for a constructed family.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters of every function, in index order.
    #[must_use]
    pub fn params(&self) -> &[HashParams] {
        &self.params
    }

    /// Hash `x` with the function at `function_index`.
    ///
    /// # Panics
    /// Panics if `function_index >= self.len()`.
    #[inline]
    #[must_use]
    pub fn hash(&self, function_index: usize, x: u64) -> u64 {
        self.params[function_index].apply(x)
    }

    /// Hash `x` with every function, in index order.
    pub fn hash_all(&self, x: u64) -> impl Iterator<Item = u64> + '_ {
        self.params.iter().map(move |p| p.apply(x))
    }
}
