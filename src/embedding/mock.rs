//! Scripted embedder for tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::provider::ProviderError;

use super::EmbeddingClient;
use super::stub::stub_embedding;

/// Returns scripted results per input text.
///
/// Scripted results for a text are consumed in order, except that a final
/// `Ok` stays in place and answers every later call. Texts without a script
/// get [`stub_embedding`].
#[derive(Debug)]
pub struct MockEmbeddingClient {
    dimension: usize,
    scripts: Mutex<HashMap<String, VecDeque<Result<Vec<f32>, ProviderError>>>>,
    calls: Mutex<Vec<String>>,
}

impl MockEmbeddingClient {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues `result` as the next answer for `text`.
    pub fn push(&self, text: &str, result: Result<Vec<f32>, ProviderError>) -> &Self {
        self.scripts
            .lock()
            .entry(text.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Scripts `vector` as the answer for `text`.
    pub fn with_vector(self, text: &str, vector: Vec<f32>) -> Self {
        self.push(text, Ok(vector));
        self
    }

    /// Texts passed to `embed`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, text: &str) -> usize {
        self.calls.lock().iter().filter(|t| *t == text).count()
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.lock().push(text.to_string());

        let mut scripts = self.scripts.lock();
        let Some(queue) = scripts.get_mut(text) else {
            return Ok(stub_embedding(text, self.dimension));
        };

        match queue.len() {
            0 => Ok(stub_embedding(text, self.dimension)),
            1 if matches!(queue.front(), Some(Ok(_))) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(stub_embedding(text, self.dimension))),
            _ => queue
                .pop_front()
                .unwrap_or_else(|| Ok(stub_embedding(text, self.dimension))),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
