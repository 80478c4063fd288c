//! plagd library crate (used by the server binary and integration tests).
//!
//! Generates model-written sample answers for writing assignments and scores
//! student submissions against them by cosine similarity of embeddings.
//!
//! # Public API Surface
//!
//! ## Core
//! - [`SampleGenerationPipeline`] - completion, then concurrent embed + persist per sample
//! - [`SubmissionScoringService`] - embed a submission and rank stored samples
//! - [`SimilarityScorer`] - pure thresholded top-k cosine ranking
//!
//! ## Collaborators
//! - [`CompletionClient`], [`EmbeddingClient`] - model providers (stub or OpenAI-compatible)
//! - [`SampleStore`] - assignments and samples (in-memory or Supabase)
//!
//! ## Runtime
//! - [`GenerationQueue`], [`GenerationWorker`], [`FailureSink`] - background generation
//! - [`RetryPolicy`], [`retry_on_rate_limit`] - fixed-backoff rate-limit retry
//! - [`Config`] - `PLAGD_*` environment configuration
//! - [`gateway`] - Axum router
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod comparison;
pub mod completion;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod scoring;
pub mod store;
pub mod text;

pub use comparison::{ComparisonError, SimilarityResult, SubmissionScoringService};
pub use completion::{CompletionClient, OpenAiCompletionClient, StubCompletionClient};
#[cfg(any(test, feature = "mock"))]
pub use completion::{CompletionCall, MockCompletionClient};
pub use config::{Config, ConfigError, ProviderMode};
pub use constants::{DimConfig, DimValidationError, validate_embedding_dim};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingClient;
pub use embedding::{EmbeddingClient, OpenAiEmbeddingClient, StubEmbeddingClient};
pub use hashing::hash_to_u64;
#[cfg(any(test, feature = "mock"))]
pub use pipeline::RecordingFailureSink;
pub use pipeline::{
    FailureSink, GenerationError, GenerationJob, GenerationQueue, GenerationReport,
    GenerationWorker, PipelineConfig, QueueError, SampleError, SampleGenerationPipeline,
    TracingFailureSink, spawn_generation_worker,
};
pub use provider::{OpenAiConfig, OpenAiTransport, ProviderError};
#[cfg(any(test, feature = "mock"))]
pub use retry::RecordingSleeper;
pub use retry::{RateLimitSignal, RetryPolicy, Sleeper, TokioSleeper, retry_on_rate_limit};
pub use scoring::{RankedMatch, ScoringError, SimilarityScorer, cosine_similarity};
pub use store::{
    Assignment, AssignmentId, InMemorySampleStore, SampleId, SampleResponse, SampleStore,
    StoreError, SupabaseConfig, SupabaseSampleStore,
};
pub use text::{normalize_prompt, word_limit_to_tokens};
