//! Locality-Sensitive Hashing (LSH) index for near-duplicate lookup.
//!
//! Each sketch is cut into `bands` slices of `rows` consecutive values. A
//! stored document becomes a candidate for a query only if both agree on a
//! whole band, so a lookup compares against colliding documents instead of
//! the whole corpus.

use crate::config::SimilarityConfig;
use crate::minhash::{MinHasher, Sketch};
use dupsketch_core::{DupsketchError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, trace};

/// Document ID type. IDs are assigned in insertion order.
pub type DocId = usize;

/// Bucket key: one band's row values together with the band index.
///
/// Carrying the band index keeps equal row values from different bands in
/// separate buckets.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BandSignature {
    band: usize,
    rows: Box<[u64]>,
}

impl BandSignature {
    /// Index of the band within the sketch.
    #[must_use]
    pub fn band(&self) -> usize {
        self.band
    }

    /// The sketch values covered by this band.
    #[must_use]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }
}

impl fmt::Display for BandSignature {
    /// Row values then the band index, each zero-padded to 10 digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.rows.iter() {
            write!(f, "{value:010}")?;
        }
        write!(f, "{:010}", self.band)
    }
}

/// A stored document whose sketch met the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarMatch {
    /// ID of the stored document.
    pub doc_id: DocId,
    /// Estimated Jaccard similarity to the query.
    pub similarity: f64,
}

/// Counters since construction or the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Mutating lookups performed.
    pub queries: u64,
    /// Lookups that found a similar document.
    pub matches: u64,
    /// Full sketch comparisons performed by mutating lookups.
    pub comparisons: u64,
    /// Documents stored.
    pub documents: usize,
}

/// Result of scanning the buckets for one sketch.
struct Probe {
    found: Option<SimilarMatch>,
    comparisons: u64,
}

/// LSH bucket index answering "has a similar document been seen?".
///
/// Not internally synchronized: the check-then-insert sequence of
/// [`look_for_similar_documents`](Self::look_for_similar_documents) needs
/// exclusive access. Use [`SharedSimilarityIndex`](crate::SharedSimilarityIndex)
/// to share one index between threads.
#[derive(Debug)]
pub struct SimilarityIndex {
    /// Match threshold on the [0, 1] similarity scale.
    threshold: f64,
    /// Number of bands.
    bands: usize,
    /// Rows per band.
    rows: usize,
    /// Sketch engine.
    hasher: MinHasher,
    /// Stored sketches, indexed by `DocId`.
    sketches: Vec<Sketch>,
    /// Band signature -> documents in that bucket, in insertion order.
    buckets: HashMap<BandSignature, Vec<DocId>>,
    stats: IndexStats,
}

impl SimilarityIndex {
    /// Create an index seeded with the default seed.
    ///
    /// `threshold` is on the same [0, 1] scale as
    /// [`MinHasher::compare_sketches`].
    pub fn new(
        threshold: f64,
        tokens_in_word: usize,
        num_hash_functions: usize,
        bands: usize,
        rows: usize,
    ) -> Result<Self> {
        Self::from_config(&SimilarityConfig::new(
            threshold,
            tokens_in_word,
            num_hash_functions,
            bands,
            rows,
        ))
    }

    /// Create an index from a configuration.
    pub fn from_config(config: &SimilarityConfig) -> Result<Self> {
        config.validate()?;
        let hasher = MinHasher::with_seed(
            config.tokens_in_word,
            config.num_hash_functions,
            config.seed,
        )?;
        Self::with_hasher(hasher, config.threshold, config.bands, config.rows)
    }

    /// Create an index around an existing sketch engine.
    pub fn with_hasher(hasher: MinHasher, threshold: f64, bands: usize, rows: usize) -> Result<Self> {
        SimilarityConfig::new(
            threshold,
            hasher.tokens_in_word(),
            hasher.num_hash_functions(),
            bands,
            rows,
        )
        .validate()?;

        info!(
            threshold,
            bands,
            rows,
            num_hash_functions = hasher.num_hash_functions(),
            tokens_in_word = hasher.tokens_in_word(),
            "Created similarity index"
        );

        Ok(Self {
            threshold,
            bands,
            rows,
            hasher,
            sketches: Vec::new(),
            buckets: HashMap::new(),
            stats: IndexStats::default(),
        })
    }

    /// Get the similarity threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Get the number of bands.
    #[must_use]
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Get the number of rows per band.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The sketch engine used for every lookup.
    #[must_use]
    pub fn hasher(&self) -> &MinHasher {
        &self.hasher
    }

    /// Bucket key of band `band` of `sketch`.
    ///
    /// # Panics
    /// Panics if the band lies outside the sketch.
    #[must_use]
    pub fn band_signature(&self, sketch: &Sketch, band: usize) -> BandSignature {
        let start = band * self.rows;
        BandSignature {
            band,
            rows: sketch.values()[start..start + self.rows].into(),
        }
    }

    fn band_signatures(&self, sketch: &Sketch) -> Vec<BandSignature> {
        (0..self.bands)
            .map(|band| self.band_signature(sketch, band))
            .collect()
    }

    /// Scan colliding buckets; each stored sketch is compared at most once.
    fn probe(&self, sketch: &Sketch, signatures: &[BandSignature]) -> Probe {
        let mut compared: HashSet<DocId> = HashSet::new();
        let mut comparisons = 0;

        for signature in signatures {
            let Some(bucket) = self.buckets.get(signature) else {
                continue;
            };

            for &doc_id in bucket {
                if !compared.insert(doc_id) {
                    continue;
                }

                comparisons += 1;
                let similarity = sketch.agreement(&self.sketches[doc_id]);
                trace!(doc_id, band = signature.band(), similarity, "Compared candidate");

                if similarity >= self.threshold {
                    return Probe {
                        found: Some(SimilarMatch { doc_id, similarity }),
                        comparisons,
                    };
                }
            }
        }

        Probe {
            found: None,
            comparisons,
        }
    }

    /// Look for a previously seen document similar to `document`.
    ///
    /// The text is split on whitespace and sketched. Returns `true` as soon
    /// as a colliding document meets the threshold. Otherwise the sketch is
    /// added to every one of its band buckets and `false` is returned.
    pub fn look_for_similar_documents(&mut self, document: &str) -> bool {
        let sketch = self.hasher.sketch_text(document);
        self.check_and_insert(sketch)
    }

    /// Same as [`look_for_similar_documents`](Self::look_for_similar_documents)
    /// for a precomputed sketch.
    pub fn look_for_similar_sketch(&mut self, sketch: Sketch) -> Result<bool> {
        let expected = self.hasher.num_hash_functions();
        if sketch.len() != expected {
            return Err(DupsketchError::ShapeMismatch {
                expected,
                got: sketch.len(),
            });
        }
        Ok(self.check_and_insert(sketch))
    }

    /// Query then insert. Returns true if a similar document was found.
    pub(crate) fn check_and_insert(&mut self, sketch: Sketch) -> bool {
        let signatures = self.band_signatures(&sketch);
        let probe = self.probe(&sketch, &signatures);

        self.stats.queries += 1;
        self.stats.comparisons += probe.comparisons;

        if let Some(found) = probe.found {
            self.stats.matches += 1;
            debug!(
                doc_id = found.doc_id,
                similarity = found.similarity,
                comparisons = probe.comparisons,
                "Similar document found"
            );
            return true;
        }

        let doc_id = self.sketches.len();
        self.sketches.push(sketch);
        for signature in signatures {
            self.buckets.entry(signature).or_default().push(doc_id);
        }

        debug!(doc_id, comparisons = probe.comparisons, "Inserted document");
        false
    }

    /// Find a stored document similar to `document` without inserting it.
    #[must_use]
    pub fn find_similar(&self, document: &str) -> Option<SimilarMatch> {
        let sketch = self.hasher.sketch_text(document);
        let signatures = self.band_signatures(&sketch);
        self.probe(&sketch, &signatures).found
    }

    /// The stored sketch of a document.
    #[must_use]
    pub fn sketch(&self, doc_id: DocId) -> Option<&Sketch> {
        self.sketches.get(doc_id)
    }

    /// Get the number of stored documents.
    #[must_use]
    pub fn num_documents(&self) -> usize {
        self.sketches.len()
    }

    /// Get the number of non-empty buckets.
    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no document is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    /// Counters since construction or the last clear.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.sketches.len(),
            ..self.stats
        }
    }

    /// Forget every stored document and reset the counters.
    pub fn clear_documents(&mut self) {
        info!(documents = self.sketches.len(), "Clearing similarity index");
        self.buckets.clear();
        self.sketches.clear();
        self.stats = IndexStats::default();
    }
}
