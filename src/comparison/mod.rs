//! Synchronous originality check of a submission against stored samples.
//!
//! The submission is embedded exactly as written. Its vector must have the
//! scorer's dimension; a mismatch means the embedding provider broke its
//! contract and is reported as [`ComparisonError::EmbeddingShape`]. An
//! assignment without samples scores to an empty list.

pub mod error;
pub mod service;


pub use error::ComparisonError;
pub use service::{SimilarityResult, SubmissionScoringService};
