//! HTTP transport for OpenAI-compatible APIs.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ProviderError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const PROVIDER_NAME: &str = "openai";

/// Quota exhaustion is reported as 429 too, but waiting will not fix it.
const INSUFFICIENT_QUOTA: &str = "insufficient_quota";

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub completion_model: String,
    pub embedding_model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("completion_model", &self.completion_model)
            .field("embedding_model", &self.embedding_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// A configured HTTP client shared by the completion and embedding clients.
#[derive(Clone, Debug)]
pub struct OpenAiTransport {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiTransport {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// POSTs `body` to `path` and decodes the JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!(%url, "Sending provider request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME,
                status: e.status().map(|s| s.as_u16()),
                message: if e.is_timeout() {
                    format!("request timed out after {:?}", self.config.timeout)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(classify_failure(status, text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER_NAME,
                reason: e.to_string(),
            })
    }
}

/// Maps a non-success HTTP status to the provider error taxonomy.
pub(crate) fn classify_failure(status: StatusCode, body: String) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS && !body.contains(INSUFFICIENT_QUOTA) {
        return ProviderError::RateLimited {
            provider: PROVIDER_NAME,
        };
    }

    ProviderError::RequestFailed {
        provider: PROVIDER_NAME,
        status: Some(status.as_u16()),
        message: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_status_is_retryable() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
        assert_eq!(err, ProviderError::RateLimited { provider: "openai" });
    }

    #[test]
    fn test_quota_exhaustion_is_not_rate_limit() {
        let body = r#"{"error":{"code":"insufficient_quota"}}"#.to_string();
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(
            err,
            ProviderError::RequestFailed {
                status: Some(429),
                ..
            }
        ));
    }

    #[test]
    fn test_server_error_is_request_failed() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert_eq!(err.to_string(), "openai request failed (502): upstream");
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = OpenAiConfig::new("key").with_base_url("http://localhost:9000/v1/");
        assert_eq!(
            config.endpoint("embeddings"),
            "http://localhost:9000/v1/embeddings"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = OpenAiConfig::new("sk-secret");
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
