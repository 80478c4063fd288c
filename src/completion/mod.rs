//! Text completion providers.
//!
//! - [`StubCompletionClient`] returns canned samples for development and tests.
//! - [`OpenAiCompletionClient`] calls an OpenAI-compatible `/chat/completions` endpoint.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod stub;


use async_trait::async_trait;

use crate::provider::ProviderError;

pub use openai::OpenAiCompletionClient;
pub use stub::{STUB_SAMPLE_RESPONSE, StubCompletionClient};

#[cfg(any(test, feature = "mock"))]
pub use mock::{CompletionCall, MockCompletionClient};

#[async_trait]
/// Turns a prompt into `n` independent completions.
pub trait CompletionClient: Send + Sync {
    /// Requests `n` completions of `prompt` in one call, each limited to
    /// roughly `max_tokens` tokens.
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        n: usize,
    ) -> Result<Vec<String>, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
