//! Shared plumbing for model providers.
//!
//! [`ProviderError`] is the failure taxonomy used by both
//! [`CompletionClient`](crate::completion::CompletionClient) and
//! [`EmbeddingClient`](crate::embedding::EmbeddingClient). [`openai`] holds the
//! HTTP transport for OpenAI-compatible endpoints.

pub mod error;
pub mod openai;

pub use error::ProviderError;
pub use openai::{DEFAULT_OPENAI_BASE_URL, OpenAiConfig, OpenAiTransport};
