//! Text embedding providers.
//!
//! - [`StubEmbeddingClient`] produces deterministic vectors for development and tests.
//! - [`OpenAiEmbeddingClient`] calls an OpenAI-compatible `/embeddings` endpoint.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod stub;


use async_trait::async_trait;

use crate::provider::ProviderError;

pub use openai::OpenAiEmbeddingClient;
pub use stub::{StubEmbeddingClient, stub_embedding};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingClient;

#[async_trait]
/// Turns text into a fixed-dimension vector.
pub trait EmbeddingClient: Send + Sync {
    /// Embeds `text` as-is.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// The dimension every returned vector is expected to have.
    fn dimension(&self) -> usize;

    fn provider_name(&self) -> &'static str;
}
