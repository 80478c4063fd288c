use async_trait::async_trait;
use tracing::debug;

use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::hashing::hash_to_u64;
use crate::provider::ProviderError;

use super::EmbeddingClient;

/// Deterministic embedder for development mode. Equal texts map to equal vectors.
#[derive(Debug, Clone, Copy)]
pub struct StubEmbeddingClient {
    dimension: usize,
}

impl Default for StubEmbeddingClient {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl StubEmbeddingClient {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingClient for StubEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        debug!(text_len = text.len(), "Generating stub embedding");
        Ok(stub_embedding(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Pseudo-random vector in `[-1, 1]^dimension` seeded from the BLAKE3 hash of `text`.
pub fn stub_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let mut state = hash_to_u64(text.as_bytes());
    (0..dimension)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}
