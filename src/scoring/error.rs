use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("query embedding shape mismatch: expected {expected} dimensions, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error(
        "candidate {candidate} embedding shape mismatch: expected {expected} dimensions, got {actual}"
    )]
    CandidateShapeMismatch {
        candidate: usize,
        expected: usize,
        actual: usize,
    },
}
