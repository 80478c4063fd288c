//! Scripted completion client for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::provider::ProviderError;

use super::CompletionClient;

/// Arguments of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    pub prompt: String,
    pub max_tokens: u32,
    pub n: usize,
}

/// Answers `generate` from a queue of scripted results.
///
/// When the queue is empty the client returns `n` numbered samples
/// (`"sample 1"`, `"sample 2"`, ...).
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    script: Mutex<VecDeque<Result<Vec<String>, ProviderError>>>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always-successful client returning `completions` once.
    pub fn returning<I, S>(completions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        client.push(Ok(completions.into_iter().map(Into::into).collect()));
        client
    }

    pub fn push(&self, result: Result<Vec<String>, ProviderError>) -> &Self {
        self.script.lock().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        n: usize,
    ) -> Result<Vec<String>, ProviderError> {
        self.calls.lock().push(CompletionCall {
            prompt: prompt.to_string(),
            max_tokens,
            n,
        });

        match self.script.lock().pop_front() {
            Some(result) => result,
            None => Ok((1..=n).map(|i| format!("sample {i}")).collect()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
