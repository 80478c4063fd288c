//! Cross-cutting, shared constants.
//!
//! # Dimension Invariants
//!
//! Every stored sample embedding and every submission embedding must have the
//! dimension of the embedding model in use. [`DEFAULT_EMBEDDING_DIM`] matches
//! `text-embedding-3-small`; other models are configured through [`DimConfig`]
//! and checked with [`validate_embedding_dim`] at module boundaries.

use std::time::Duration;

pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Minimum similarity a sample must strictly exceed to be reported.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Maximum number of matches returned by a comparison.
pub const DEFAULT_TOP_K: usize = 3;

/// Completions requested per assignment.
pub const DEFAULT_SAMPLE_COUNT: usize = 2;

pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

pub const MIN_WORD_LIMIT: i64 = 0;
pub const MAX_WORD_LIMIT: i64 = 1000;

/// Runtime dimension configuration shared by the embedder and the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimConfig {
    /// The embedding vector dimension (number of floats).
    pub embedding_dim: usize,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl DimConfig {
    /// Creates a new dimension configuration with the specified embedding dimension.
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Returns an error if `embedding_dim` is zero.
    pub fn validate(&self) -> Result<(), DimValidationError> {
        if self.embedding_dim == 0 {
            return Err(DimValidationError::ZeroDimension);
        }
        Ok(())
    }

    /// Checks `vector` against the configured dimension.
    pub fn check(&self, vector: &[f32]) -> Result<(), DimValidationError> {
        validate_embedding_dim(vector.len(), self.embedding_dim)
    }
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use plagd::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// let embedder_dim = 1536;
/// validate_embedding_dim(embedder_dim, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
