use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::provider::{OpenAiTransport, ProviderError};

use super::CompletionClient;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    index: u32,
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Completions from an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    transport: OpenAiTransport,
}

impl OpenAiCompletionClient {
    pub fn new(transport: OpenAiTransport) -> Self {
        Self { transport }
    }

    pub fn model(&self) -> &str {
        &self.transport.config().completion_model
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        n: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let request = ChatRequest {
            model: self.model(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            n,
            // A zero budget means "no limit" rather than an empty answer.
            max_tokens: (max_tokens > 0).then_some(max_tokens),
        };

        let response: ChatResponse = self
            .transport
            .post_json("chat/completions", &request)
            .await?;

        let completions = collect_completions(response);
        if completions.is_empty() {
            return Err(ProviderError::InvalidResponse {
                provider: self.transport.provider_name(),
                reason: "response contained no completions".to_string(),
            });
        }

        if completions.len() != n {
            warn!(
                requested = n,
                received = completions.len(),
                "Provider returned a different number of completions than requested"
            );
        }

        Ok(completions)
    }

    fn provider_name(&self) -> &'static str {
        self.transport.provider_name()
    }
}

/// Non-empty choice contents in provider index order.
fn collect_completions(response: ChatResponse) -> Vec<String> {
    let mut choices = response.choices;
    choices.sort_by_key(|c| c.index);

    choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_zero_token_budget() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [ChatMessage {
                role: "user",
                content: "Write about dogs.",
            }],
            n: 2,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["n"], 2);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_choices_are_ordered_by_index() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [
                {"index": 1, "message": {"role": "assistant", "content": "second"}},
                {"index": 0, "message": {"role": "assistant", "content": "first"}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(collect_completions(response), vec!["first", "second"]);
    }

    #[test]
    fn test_empty_and_null_contents_are_dropped() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [
                {"index": 0, "message": {"content": null}},
                {"index": 1, "message": {"content": "   "}},
                {"index": 2, "message": {"content": "kept"}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(collect_completions(response), vec!["kept"]);
    }

    #[test]
    fn test_missing_choices_yield_nothing() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(collect_completions(response).is_empty());
    }
}
