//! Batch deduplication over a document set.
//!
//! Documents are fed to a [`SimilarityIndex`] in order; the first document of
//! each near-duplicate group is kept and later ones are dropped.

use crate::io::Document;
use crate::lsh::SimilarityIndex;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Statistics from a deduplication run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupStats {
    /// Documents processed.
    pub total_documents: usize,
    /// Documents kept.
    pub unique_documents: usize,
    /// Documents dropped as near-duplicates.
    pub duplicate_count: usize,
    /// `duplicate_count / total_documents`.
    pub duplicate_ratio: f64,
    /// Full sketch comparisons performed.
    pub comparisons: u64,
    /// Wall-clock time in seconds.
    pub elapsed_secs: f64,
}

impl DedupStats {
    /// Throughput in documents per second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.total_documents as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Outcome of [`deduplicate_documents`].
#[derive(Debug, Clone, Default)]
pub struct DedupResult {
    /// Positions (into the input slice) of documents to keep.
    pub keep_indices: Vec<usize>,
    /// Positions of documents found similar to an earlier one.
    pub duplicate_indices: Vec<usize>,
    /// Run statistics.
    pub stats: DedupStats,
}

/// Deduplicate `docs` against `index`, inserting every kept document.
///
/// The index may already hold documents from earlier batches; those count as
/// "seen before" for this batch.
pub fn deduplicate_documents(index: &mut SimilarityIndex, docs: &[Document]) -> DedupResult {
    deduplicate_with_progress(index, docs, |_| {})
}

/// Like [`deduplicate_documents`], calling `on_document` after each document
/// with the number processed so far.
pub fn deduplicate_with_progress<F>(
    index: &mut SimilarityIndex,
    docs: &[Document],
    mut on_document: F,
) -> DedupResult
where
    F: FnMut(usize),
{
    let start = Instant::now();
    let comparisons_before = index.stats().comparisons;

    let mut keep_indices = Vec::new();
    let mut duplicate_indices = Vec::new();

    for (i, doc) in docs.iter().enumerate() {
        if index.look_for_similar_documents(&doc.text) {
            duplicate_indices.push(i);
        } else {
            keep_indices.push(i);
        }
        on_document(i + 1);
    }

    let total = docs.len();
    let stats = DedupStats {
        total_documents: total,
        unique_documents: keep_indices.len(),
        duplicate_count: duplicate_indices.len(),
        duplicate_ratio: if total > 0 {
            duplicate_indices.len() as f64 / total as f64
        } else {
            0.0
        },
        comparisons: index.stats().comparisons - comparisons_before,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    info!(
        total = stats.total_documents,
        unique = stats.unique_documents,
        duplicates = stats.duplicate_count,
        "Deduplication finished"
    );

    DedupResult {
        keep_indices,
        duplicate_indices,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SimilarityIndex {
        SimilarityIndex::new(0.8, 5, 400, 20, 20).unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        let result = deduplicate_documents(&mut index(), &[]);

        assert_eq!(result.stats.total_documents, 0);
        assert_eq!(result.stats.duplicate_count, 0);
        assert!(result.keep_indices.is_empty());
        assert!(result.stats.duplicate_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_keeps_first_of_each_group() {
        let fox = "The quick brown fox jumps over the lazy dog";
        let cat = "The lazy cat sleeps on the warm windowsill all afternoon";
        let docs: Vec<Document> = [fox, cat, fox, cat, fox]
            .iter()
            .enumerate()
            .map(|(i, t)| Document::new(i as u64, (*t).to_string()))
            .collect();

        let result = deduplicate_documents(&mut index(), &docs);

        assert_eq!(result.keep_indices, vec![0, 1]);
        assert_eq!(result.duplicate_indices, vec![2, 3, 4]);
        assert_eq!(result.stats.unique_documents, 2);
        assert!((result.stats.duplicate_ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_progress_callback() {
        let docs: Vec<Document> = (0..5)
            .map(|i| Document::new(i, format!("document number {i} text")))
            .collect();

        let mut seen = Vec::new();
        deduplicate_with_progress(&mut index(), &docs, |n| seen.push(n));

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_index_carries_across_batches() {
        let mut index = index();
        let batch = vec![Document::new(0, "repeated across two batches".to_string())];

        let first = deduplicate_documents(&mut index, &batch);
        let second = deduplicate_documents(&mut index, &batch);

        assert_eq!(first.stats.unique_documents, 1);
        assert_eq!(second.stats.duplicate_count, 1);
    }
}
