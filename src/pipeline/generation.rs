use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::completion::CompletionClient;
use crate::constants::{DEFAULT_SAMPLE_COUNT, DimConfig};
use crate::embedding::EmbeddingClient;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_on_rate_limit};
use crate::store::{SampleId, SampleStore};
use crate::text::{normalize_prompt, word_limit_to_tokens};

use super::error::{GenerationError, SampleError};
use super::types::{GenerationJob, GenerationReport, SampleFailure, StoredSample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Completions requested per run.
    pub sample_count: usize,
    pub retry: RetryPolicy,
    pub dims: DimConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            retry: RetryPolicy::default(),
            dims: DimConfig::default(),
        }
    }
}

/// Completion -> (embed -> persist) x N.
pub struct SampleGenerationPipeline {
    completions: Arc<dyn CompletionClient>,
    embeddings: Arc<dyn EmbeddingClient>,
    store: Arc<dyn SampleStore>,
    sleeper: Arc<dyn Sleeper>,
    config: PipelineConfig,
}

impl std::fmt::Debug for SampleGenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleGenerationPipeline")
            .field("completions", &self.completions.provider_name())
            .field("embeddings", &self.embeddings.provider_name())
            .field("store", &self.store.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

impl SampleGenerationPipeline {
    pub fn new(
        completions: Arc<dyn CompletionClient>,
        embeddings: Arc<dyn EmbeddingClient>,
        store: Arc<dyn SampleStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            completions,
            embeddings,
            store,
            sleeper: Arc::new(TokioSleeper),
            config,
        }
    }

    /// Replaces the clock used for rate-limit backoff.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generates, embeds and stores samples for `job`.
    ///
    /// Returns only after every sibling has reached a terminal state.
    pub async fn run(&self, job: &GenerationJob) -> Result<GenerationReport, GenerationError> {
        let prompt = normalize_prompt(&job.prompt);
        let max_tokens = word_limit_to_tokens(job.word_limit);
        let n = self.config.sample_count;

        debug!(
            assignment_id = job.assignment_id,
            prompt_len = prompt.len(),
            max_tokens,
            n,
            "Requesting sample completions"
        );

        let completions = retry_on_rate_limit(
            &self.config.retry,
            self.sleeper.as_ref(),
            "completion",
            || self.completions.generate(&prompt, max_tokens, n),
        )
        .await
        .map_err(|source| GenerationError::Completion {
            assignment_id: job.assignment_id,
            source,
        })?;

        let total = completions.len();
        let outcomes = join_all(
            completions
                .iter()
                .enumerate()
                .map(|(index, text)| self.store_sample(job, index, text)),
        )
        .await;

        let mut report = GenerationReport {
            assignment_id: job.assignment_id,
            total,
            stored: Vec::new(),
            failures: Vec::new(),
        };
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(sample_id) => report.stored.push(StoredSample { index, sample_id }),
                Err(error) => report.failures.push(SampleFailure { index, error }),
            }
        }

        if report.is_complete() {
            info!(
                assignment_id = job.assignment_id,
                stored = report.stored_count(),
                "Sample generation complete"
            );
            Ok(report)
        } else {
            Err(GenerationError::SamplesFailed(report))
        }
    }

    async fn store_sample(
        &self,
        job: &GenerationJob,
        index: usize,
        text: &str,
    ) -> Result<SampleId, SampleError> {
        let embedding = retry_on_rate_limit(
            &self.config.retry,
            self.sleeper.as_ref(),
            "embedding",
            || self.embeddings.embed(text),
        )
        .await
        .map_err(SampleError::Embedding)?;

        self.config
            .dims
            .check(&embedding)
            .map_err(SampleError::Shape)?;

        let sample_id = self
            .store
            .save_sample(&job.user_id, job.assignment_id, text, &embedding)
            .await
            .map_err(SampleError::Store)?;

        debug!(
            assignment_id = job.assignment_id,
            index, sample_id, "Sample stored"
        );
        Ok(sample_id)
    }
}
