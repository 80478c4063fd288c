use thiserror::Error;

use crate::provider::ProviderError;
use crate::scoring::ScoringError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("embedding submission failed: {0}")]
    Embedding(#[from] ProviderError),

    #[error("submission embedding has dimension {actual}, expected {expected}")]
    EmbeddingShape { expected: usize, actual: usize },

    #[error("loading samples failed: {0}")]
    Store(#[from] StoreError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}
