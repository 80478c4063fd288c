use async_trait::async_trait;
use tracing::debug;

use crate::provider::ProviderError;

use super::CompletionClient;

pub const STUB_SAMPLE_RESPONSE: &str = "This is a sample response.";

/// Returns `n` copies of [`STUB_SAMPLE_RESPONSE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StubCompletionClient;

#[async_trait]
impl CompletionClient for StubCompletionClient {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        n: usize,
    ) -> Result<Vec<String>, ProviderError> {
        debug!(
            prompt_len = prompt.len(),
            max_tokens, n, "Generating stub completions"
        );
        Ok(vec![STUB_SAMPLE_RESPONSE.to_string(); n])
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}
