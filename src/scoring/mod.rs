//! Cosine-similarity ranking of a submission embedding against sample embeddings.
//!
//! [`SimilarityScorer`] is pure: no I/O, no interior state, safe to share
//! across concurrent comparison requests. Candidates whose similarity does not
//! strictly exceed the threshold are dropped; the rest are ordered by
//! descending similarity with ties kept in input order, then truncated to
//! `top_k`.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::{SimilarityScorer, cosine_similarity};
pub use types::RankedMatch;
