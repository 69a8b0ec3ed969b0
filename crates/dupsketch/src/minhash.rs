//! MinHash sketch generation for document similarity.
//!
//! A sketch keeps, for every function of a [`HashFamily`], the minimum hash
//! value seen over a document's shingles. The fraction of positions on which
//! two sketches agree estimates the Jaccard similarity of the shingle sets.

use dupsketch_core::hashing::{shingle_code, HashFamily, DEFAULT_SEED, UNIVERSE_SIZE};
use dupsketch_core::{DupsketchError, Result};
use rand::Rng;

/// Default number of hash functions (sketch length).
pub const DEFAULT_NUM_HASH_FUNCTIONS: usize = 400;

/// Default number of tokens concatenated into one shingle.
pub const DEFAULT_TOKENS_IN_WORD: usize = 5;

/// MinHash sketch - the per-function minimum hash values of one document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sketch {
    values: Vec<u64>,
}

impl Sketch {
    /// Wrap raw sketch values.
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// The sketch of an empty document: `len` copies of [`UNIVERSE_SIZE`].
    #[must_use]
    pub fn sentinel(len: usize) -> Self {
        Self::new(vec![UNIVERSE_SIZE; len])
    }

    /// The minimum hash values, one per hash function.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Get the number of values in this sketch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the sketch has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if no shingle ever lowered any position (empty document).
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.values.iter().all(|&v| v == UNIVERSE_SIZE)
    }

    /// Fraction of positions on which two sketches agree.
    ///
    /// Positions present in only one sketch count as disagreements, so the
    /// result is symmetric. Callers outside the crate go through
    /// [`MinHasher::compare_sketches`], which rejects mismatched lengths.
    pub(crate) fn agreement(&self, other: &Sketch) -> f64 {
        let len = self.values.len().max(other.values.len());
        if len == 0 {
            return 0.0;
        }

        let matches = self
            .values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a == b)
            .count();

        matches as f64 / len as f64
    }
}

/// MinHash sketch engine.
///
/// Builds fixed-length sketches from token sequences. The number of shingles
/// per document equals the number of hash functions: shingle `i` starts at
/// token `i`, so short documents contribute truncated (eventually empty)
/// shingles and long documents are only read up to offset
/// `num_hash_functions - 1`.
#[derive(Clone, Debug)]
pub struct MinHasher {
    /// Tokens concatenated per shingle.
    tokens_in_word: usize,
    /// One function per sketch position.
    family: HashFamily,
}

impl MinHasher {
    /// Create a sketch engine seeded with [`DEFAULT_SEED`].
    pub fn new(tokens_in_word: usize, num_hash_functions: usize) -> Result<Self> {
        Self::with_seed(tokens_in_word, num_hash_functions, DEFAULT_SEED)
    }

    /// Create a sketch engine with a specific random seed.
    pub fn with_seed(tokens_in_word: usize, num_hash_functions: usize, seed: u64) -> Result<Self> {
        Self::validate_tokens_in_word(tokens_in_word)?;
        let family = HashFamily::with_seed(num_hash_functions, seed)?;
        Ok(Self {
            tokens_in_word,
            family,
        })
    }

    /// Create a sketch engine drawing hash parameters from `rng`.
    pub fn from_rng<R: Rng>(
        tokens_in_word: usize,
        num_hash_functions: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Self::validate_tokens_in_word(tokens_in_word)?;
        let family = HashFamily::from_rng(num_hash_functions, rng)?;
        Ok(Self {
            tokens_in_word,
            family,
        })
    }

    fn validate_tokens_in_word(tokens_in_word: usize) -> Result<()> {
        if tokens_in_word == 0 {
            return Err(DupsketchError::config(
                "number of tokens in a word must be positive, got 0",
            ));
        }
        Ok(())
    }

    /// Get the number of hash functions (sketch length).
    #[must_use]
    pub fn num_hash_functions(&self) -> usize {
        self.family.len()
    }

    /// Get the number of tokens per shingle.
    #[must_use]
    pub fn tokens_in_word(&self) -> usize {
        self.tokens_in_word
    }

    /// The underlying hash family.
    #[must_use]
    pub fn family(&self) -> &HashFamily {
        &self.family
    }

    /// Concatenate the token window starting at `start` into `shingle`.
    fn write_shingle<S: AsRef<str>>(&self, tokens: &[S], start: usize, shingle: &mut String) {
        shingle.clear();
        let begin = start.min(tokens.len());
        let end = (start + self.tokens_in_word).min(tokens.len());
        for token in &tokens[begin..end] {
            shingle.push_str(token.as_ref());
        }
    }

    /// The shingles a sketch is built from, in offset order.
    ///
    /// Empty input yields no shingles; otherwise exactly
    /// `num_hash_functions` are produced.
    #[must_use]
    pub fn shingles<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        if tokens.is_empty() {
            return Vec::new();
        }

        (0..self.num_hash_functions())
            .map(|start| {
                let mut shingle = String::new();
                self.write_shingle(tokens, start, &mut shingle);
                shingle
            })
            .collect()
    }

    /// Compute the MinHash sketch of a token sequence.
    ///
    /// An empty sequence yields [`Sketch::sentinel`].
    #[must_use]
    pub fn compute_sketch<S: AsRef<str>>(&self, tokens: &[S]) -> Sketch {
        let n = self.num_hash_functions();
        if tokens.is_empty() {
            return Sketch::sentinel(n);
        }

        let mut min_hashes = vec![UNIVERSE_SIZE; n];
        let mut shingle = String::new();

        for start in 0..n {
            self.write_shingle(tokens, start, &mut shingle);
            let code = shingle_code(&shingle);
            for (slot, value) in min_hashes.iter_mut().zip(self.family.hash_all(code)) {
                *slot = (*slot).min(value);
            }

            // Every later offset produces the same empty shingle.
            if start >= tokens.len() {
                break;
            }
        }

        Sketch::new(min_hashes)
    }

    /// Split `text` on whitespace and compute its sketch.
    #[must_use]
    pub fn sketch_text(&self, text: &str) -> Sketch {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        self.compute_sketch(&tokens)
    }

    /// Estimate Jaccard similarity as the fraction of equal positions.
    ///
    /// Both sketches must have exactly `num_hash_functions` values.
    pub fn compare_sketches(&self, first: &Sketch, second: &Sketch) -> Result<f64> {
        let n = self.num_hash_functions();
        for sketch in [first, second] {
            if sketch.len() != n {
                return Err(DupsketchError::ShapeMismatch {
                    expected: n,
                    got: sketch.len(),
                });
            }
        }

        Ok(first.agreement(second))
    }
}
