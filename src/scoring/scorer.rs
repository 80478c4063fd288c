use std::cmp::Ordering;
use tracing::debug;

use crate::constants::{DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K, DimConfig};

use super::error::ScoringError;
use super::types::RankedMatch;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    dims: DimConfig,
    top_k: usize,
    threshold: f32,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(DimConfig::default())
    }
}

impl SimilarityScorer {
    pub fn new(dims: DimConfig) -> Self {
        Self {
            dims,
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dims.embedding_dim
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Ranks `candidates` against `query` using the configured threshold.
    pub fn rank<'a, I, C>(
        &self,
        query: &[f32],
        candidates: C,
    ) -> Result<Vec<RankedMatch<I>>, ScoringError>
    where
        C: IntoIterator<Item = (I, &'a [f32])>,
    {
        self.score(query, candidates, self.threshold)
    }

    /// Ranks `candidates` against `query`, keeping at most `top_k` whose
    /// similarity is strictly greater than `threshold`.
    ///
    /// Fails with [`ScoringError::ShapeMismatch`] before looking at any
    /// candidate if `query` does not have the configured dimension.
    pub fn score<'a, I, C>(
        &self,
        query: &[f32],
        candidates: C,
        threshold: f32,
    ) -> Result<Vec<RankedMatch<I>>, ScoringError>
    where
        C: IntoIterator<Item = (I, &'a [f32])>,
    {
        let expected = self.dims.embedding_dim;
        if query.len() != expected {
            return Err(ScoringError::ShapeMismatch {
                expected,
                actual: query.len(),
            });
        }

        let mut considered = 0usize;
        let mut matches = Vec::new();
        for (index, (id, vector)) in candidates.into_iter().enumerate() {
            if vector.len() != expected {
                return Err(ScoringError::CandidateShapeMismatch {
                    candidate: index,
                    expected,
                    actual: vector.len(),
                });
            }
            considered += 1;

            let score = cosine_similarity(query, vector);
            if score > threshold {
                matches.push(RankedMatch::new(id, score));
            }
        }

        // `sort_by` is stable, so equal scores keep candidate order.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(self.top_k);

        debug!(
            candidates = considered,
            matched = matches.len(),
            threshold,
            top_score = matches.first().map(|m| m.score),
            "Ranked candidates by cosine similarity"
        );

        Ok(matches)
    }
}

/// Cosine similarity of two equal-length vectors, clamped to `[-1, 1]`.
///
/// Accumulates in `f64`. Returns `0.0` when the lengths differ, the vectors are
/// empty, or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}
