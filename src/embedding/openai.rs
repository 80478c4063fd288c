use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::{OpenAiTransport, ProviderError};

use super::EmbeddingClient;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    transport: OpenAiTransport,
    dimension: usize,
}

impl OpenAiEmbeddingClient {
    pub fn new(transport: OpenAiTransport, dimension: usize) -> Self {
        Self {
            transport,
            dimension,
        }
    }

    pub fn model(&self) -> &str {
        &self.transport.config().embedding_model
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: self.model(),
            input: text,
            encoding_format: "float",
        };

        let response: EmbeddingResponse = self.transport.post_json("embeddings", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: self.transport.provider_name(),
                reason: "response contained no embedding".to_string(),
            })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        self.transport.provider_name()
    }
}
