use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::EmbeddingClient;
use crate::scoring::SimilarityScorer;
use crate::store::{AssignmentId, SampleId, SampleStore};

use super::error::ComparisonError;

/// One ranked sample. Embeddings never leave the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub sample_id: SampleId,
    pub response_text: String,
    pub similarity: f32,
    pub assignment_id: AssignmentId,
}

/// Embeds a submission and ranks it against an assignment's samples.
#[derive(Clone)]
pub struct SubmissionScoringService {
    embeddings: Arc<dyn EmbeddingClient>,
    store: Arc<dyn SampleStore>,
    scorer: SimilarityScorer,
}

impl std::fmt::Debug for SubmissionScoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionScoringService")
            .field("embeddings", &self.embeddings.provider_name())
            .field("store", &self.store.backend_name())
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl SubmissionScoringService {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        store: Arc<dyn SampleStore>,
        scorer: SimilarityScorer,
    ) -> Self {
        Self {
            embeddings,
            store,
            scorer,
        }
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Returns up to `top_k` samples whose similarity to `text` exceeds the
    /// threshold, most similar first.
    ///
    /// `user_id` is only used for log context; ownership is checked by the
    /// caller.
    pub async fn score_submission(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
        text: &str,
    ) -> Result<Vec<SimilarityResult>, ComparisonError> {
        let query = self.embeddings.embed(text).await?;
        let samples = self.store.list_samples(assignment_id).await?;

        let expected = self.scorer.dimension();
        if query.len() != expected {
            return Err(ComparisonError::EmbeddingShape {
                expected,
                actual: query.len(),
            });
        }

        if samples.is_empty() {
            debug!(assignment_id, user_id, "No samples to compare against");
            return Ok(Vec::new());
        }

        let ranked = self.scorer.rank(
            &query,
            samples
                .iter()
                .map(|sample| (sample, sample.embedding.as_slice())),
        )?;

        let results: Vec<SimilarityResult> = ranked
            .into_iter()
            .map(|m| SimilarityResult {
                sample_id: m.id.id,
                response_text: m.id.response_text.clone(),
                similarity: m.score,
                assignment_id,
            })
            .collect();

        info!(
            assignment_id,
            user_id,
            samples = samples.len(),
            matches = results.len(),
            "Submission scored"
        );
        Ok(results)
    }
}
