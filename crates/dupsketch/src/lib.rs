//! # dupsketch
//!
//! Near-duplicate document detection with MinHash sketches and LSH banding.
//!
//! A document is split on whitespace, shingled, and reduced to a fixed-length
//! MinHash sketch. The sketch is cut into bands; only stored documents that
//! agree with it on a whole band are compared, so a lookup costs far less
//! than a scan of the corpus.
//!
//! ## Quick Start
//!
//! ```
//! use dupsketch::SimilarityIndex;
//!
//! # fn main() -> dupsketch::Result<()> {
//! // threshold, tokens per shingle, hash functions, bands, rows
//! let mut index = SimilarityIndex::new(0.8, 5, 400, 20, 20)?;
//!
//! let doc = "the quick brown fox jumps over the lazy dog";
//! assert!(!index.look_for_similar_documents(doc));
//! assert!(index.look_for_similar_documents(doc));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`minhash`]: sketch computation and comparison
//! - [`lsh`]: the banded bucket index
//! - [`config`]: index configuration (TOML)
//! - [`shared`]: a lock-protected index for concurrent callers
//! - [`io`]: plain-text and JSONL document sets
//! - [`dedup`]: batch deduplication

pub mod config;
pub mod dedup;
pub mod io;
pub mod lsh;
pub mod minhash;
pub mod shared;

pub use config::SimilarityConfig;
pub use dedup::{deduplicate_documents, deduplicate_with_progress, DedupResult, DedupStats};
pub use dupsketch_core::hashing::{HashFamily, HashParams, UNIVERSE_SIZE};
pub use dupsketch_core::{DupsketchError, Result};
pub use io::{
    read_documents, read_jsonl, read_jsonl_with_original, read_lines, write_jsonl, write_lines,
    Document, InputFormat, IoError,
};
pub use lsh::{BandSignature, DocId, IndexStats, SimilarMatch, SimilarityIndex};
pub use minhash::{MinHasher, Sketch};
pub use shared::SharedSimilarityIndex;
