//! Similarity index configuration.
//!
//! ```toml
//! threshold = 0.8
//! tokens_in_word = 5
//! num_hash_functions = 400
//! bands = 20
//! rows = 20
//! seed = 42
//! ```

use crate::minhash::{DEFAULT_NUM_HASH_FUNCTIONS, DEFAULT_TOKENS_IN_WORD};
use dupsketch_core::hashing::DEFAULT_SEED;
use dupsketch_core::{DupsketchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Default number of bands.
pub const DEFAULT_BANDS: usize = 20;

/// Default rows per band.
pub const DEFAULT_ROWS: usize = 20;

/// Configuration for a [`SimilarityIndex`](crate::lsh::SimilarityIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Similarity threshold (0.0 to 1.0). Sketch agreement at or above it is a match.
    pub threshold: f64,
    /// Tokens concatenated into one shingle.
    pub tokens_in_word: usize,
    /// Sketch length.
    pub num_hash_functions: usize,
    /// Number of LSH bands.
    pub bands: usize,
    /// Sketch positions per band.
    pub rows: usize,
    /// Seed for the hash family.
    pub seed: u64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            tokens_in_word: DEFAULT_TOKENS_IN_WORD,
            num_hash_functions: DEFAULT_NUM_HASH_FUNCTIONS,
            bands: DEFAULT_BANDS,
            rows: DEFAULT_ROWS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimilarityConfig {
    /// Create a fully specified configuration with the default seed.
    #[must_use]
    pub fn new(
        threshold: f64,
        tokens_in_word: usize,
        num_hash_functions: usize,
        bands: usize,
        rows: usize,
    ) -> Self {
        Self {
            threshold,
            tokens_in_word,
            num_hash_functions,
            bands,
            rows,
            seed: DEFAULT_SEED,
        }
    }

    /// Default configuration with a different threshold.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Configuration whose band split best matches `threshold`.
    ///
    /// For `b` bands of `r` rows the candidate probability of a pair with
    /// similarity `s` is `1 - (1 - s^r)^b`, whose midpoint sits near
    /// `(1/b)^(1/r)`. Picks the divisor pair of `num_hash_functions` with the
    /// midpoint closest to `threshold`.
    #[must_use]
    pub fn with_threshold_target(num_hash_functions: usize, threshold: f64) -> Self {
        let (bands, rows) = optimize_bands(num_hash_functions, threshold);
        Self {
            threshold,
            num_hash_functions,
            bands,
            rows,
            ..Default::default()
        }
    }

    /// Set the shingle size.
    #[must_use]
    pub fn tokens_in_word(mut self, tokens_in_word: usize) -> Self {
        self.tokens_in_word = tokens_in_word;
        self
    }

    /// Set the band layout and the matching sketch length.
    #[must_use]
    pub fn bands(mut self, bands: usize, rows: usize) -> Self {
        self.bands = bands;
        self.rows = rows;
        self.num_hash_functions = bands.saturating_mul(rows);
        self
    }

    /// Set the hash family seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every construction rule.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DupsketchError::config(format!(
                "threshold must be between 0.0 and 1.0, got {}",
                self.threshold
            )));
        }
        if self.tokens_in_word == 0 {
            return Err(DupsketchError::config(
                "number of tokens in a word must be positive, got 0",
            ));
        }
        if self.num_hash_functions == 0 {
            return Err(DupsketchError::config(
                "number of hash functions must be positive, got 0",
            ));
        }
        if self.bands.checked_mul(self.rows) != Some(self.num_hash_functions) {
            return Err(DupsketchError::config(format!(
                "bands * rows != num_hash_functions ({} * {} != {})",
                self.bands, self.rows, self.num_hash_functions
            )));
        }
        Ok(())
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| DupsketchError::config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DupsketchError::config(e.to_string()))
    }
}

/// Find the `(bands, rows)` split of `n` whose S-curve midpoint is closest to `t`.
fn optimize_bands(n: usize, t: f64) -> (usize, usize) {
    let mut best = (1, n.max(1));
    let mut best_diff = f64::MAX;

    for b in 1..=n {
        if n % b == 0 {
            let r = n / b;
            let estimated_t = (1.0 / b as f64).powf(1.0 / r as f64);
            let diff = (estimated_t - t).abs();
            if diff < best_diff {
                best = (b, r);
                best_diff = diff;
            }
        }
    }

    best
}
