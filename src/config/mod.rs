//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `PLAGD_*` environment variables.
//! `PLAGD_ENV=live` switches to the HTTP providers and the Supabase store,
//! which need credentials; `dev` (the default) runs entirely in-process.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_RATE_LIMIT_BACKOFF, DEFAULT_SAMPLE_COUNT,
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K, DimConfig,
};
use crate::pipeline::{DEFAULT_QUEUE_CAPACITY, PipelineConfig};
use crate::provider::OpenAiConfig;
use crate::provider::openai::{
    DEFAULT_COMPLETION_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
use crate::retry::RetryPolicy;
use crate::scoring::SimilarityScorer;
use crate::store::SupabaseConfig;

/// Which provider and store implementations the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// Stub providers and the in-memory store.
    #[default]
    Dev,
    /// OpenAI-compatible providers and the Supabase store.
    Live,
}

impl FromStr for ProviderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "live" => Ok(Self::Live),
            _ => Err(ConfigError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dev => f.write_str("dev"),
            Self::Live => f.write_str("live"),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PLAGD_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    pub mode: ProviderMode,

    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub completion_model: String,
    pub embedding_model: String,

    /// Dimension D of every embedding. Default: `1536`.
    pub embedding_dim: usize,

    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,

    /// Completions generated per assignment. Default: `2`.
    pub sample_count: usize,

    pub rate_limit_backoff: Duration,

    /// `None` retries rate-limited calls forever.
    pub max_retry_attempts: Option<u32>,

    pub similarity_threshold: f32,
    pub top_k: usize,

    /// Pending generation jobs before assignment creation answers 503.
    pub queue_capacity: usize,

    /// Per-request timeout for outbound HTTP calls.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("mode", &self.mode)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("completion_model", &self.completion_model)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dim", &self.embedding_dim)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("sample_count", &self.sample_count)
            .field("rate_limit_backoff", &self.rate_limit_backoff)
            .field("max_retry_attempts", &self.max_retry_attempts)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("top_k", &self.top_k)
            .field("queue_capacity", &self.queue_capacity)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            mode: ProviderMode::Dev,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            supabase_url: None,
            supabase_key: None,
            sample_count: DEFAULT_SAMPLE_COUNT,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            max_retry_attempts: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "PLAGD_PORT";
    const ENV_BIND_ADDR: &'static str = "PLAGD_BIND_ADDR";
    const ENV_MODE: &'static str = "PLAGD_ENV";
    const ENV_OPENAI_API_KEY: &'static str = "PLAGD_OPENAI_API_KEY";
    const ENV_OPENAI_BASE_URL: &'static str = "PLAGD_OPENAI_BASE_URL";
    const ENV_COMPLETION_MODEL: &'static str = "PLAGD_COMPLETION_MODEL";
    const ENV_EMBEDDING_MODEL: &'static str = "PLAGD_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "PLAGD_EMBEDDING_DIM";
    const ENV_SUPABASE_URL: &'static str = "PLAGD_SUPABASE_URL";
    const ENV_SUPABASE_KEY: &'static str = "PLAGD_SUPABASE_KEY";
    const ENV_SAMPLE_COUNT: &'static str = "PLAGD_SAMPLE_COUNT";
    const ENV_BACKOFF_MS: &'static str = "PLAGD_RATE_LIMIT_BACKOFF_MS";
    const ENV_MAX_RETRY_ATTEMPTS: &'static str = "PLAGD_MAX_RETRY_ATTEMPTS";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "PLAGD_SIMILARITY_THRESHOLD";
    const ENV_TOP_K: &'static str = "PLAGD_TOP_K";
    const ENV_QUEUE_CAPACITY: &'static str = "PLAGD_QUEUE_CAPACITY";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "PLAGD_REQUEST_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mode = match Self::parse_optional_string_from_env(Self::ENV_MODE) {
            Some(value) => value.parse()?,
            None => defaults.mode,
        };

        let max_retry_attempts =
            match Self::parse_number_from_env::<u32>(Self::ENV_MAX_RETRY_ATTEMPTS)? {
                Some(0) | None => None,
                Some(n) => Some(n),
            };

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            mode,
            openai_api_key: Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY),
            openai_base_url: Self::parse_string_from_env(
                Self::ENV_OPENAI_BASE_URL,
                defaults.openai_base_url,
            ),
            completion_model: Self::parse_string_from_env(
                Self::ENV_COMPLETION_MODEL,
                defaults.completion_model,
            ),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_dim: Self::parse_number_from_env(Self::ENV_EMBEDDING_DIM)?
                .unwrap_or(defaults.embedding_dim),
            supabase_url: Self::parse_optional_string_from_env(Self::ENV_SUPABASE_URL),
            supabase_key: Self::parse_optional_string_from_env(Self::ENV_SUPABASE_KEY),
            sample_count: Self::parse_number_from_env(Self::ENV_SAMPLE_COUNT)?
                .unwrap_or(defaults.sample_count),
            rate_limit_backoff: Self::parse_number_from_env(Self::ENV_BACKOFF_MS)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_backoff),
            max_retry_attempts,
            similarity_threshold: Self::parse_number_from_env(Self::ENV_SIMILARITY_THRESHOLD)?
                .unwrap_or(defaults.similarity_threshold),
            top_k: Self::parse_number_from_env(Self::ENV_TOP_K)?.unwrap_or(defaults.top_k),
            queue_capacity: Self::parse_number_from_env(Self::ENV_QUEUE_CAPACITY)?
                .unwrap_or(defaults.queue_capacity),
            request_timeout: Self::parse_number_from_env(Self::ENV_REQUEST_TIMEOUT_SECS)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }

    /// Checks numeric invariants and, in live mode, that credentials are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_DIM,
                reason: "must be greater than zero",
            });
        }
        if self.sample_count == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SAMPLE_COUNT,
                reason: "must be at least 1",
            });
        }
        if self.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TOP_K,
                reason: "must be at least 1",
            });
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SIMILARITY_THRESHOLD,
                reason: "must be within [-1, 1]",
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_QUEUE_CAPACITY,
                reason: "must be at least 1",
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                reason: "must be greater than zero",
            });
        }

        if self.mode == ProviderMode::Live {
            self.openai_config()?;
            self.supabase_config()?;
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn dims(&self) -> DimConfig {
        DimConfig::new(self.embedding_dim)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.rate_limit_backoff);
        match self.max_retry_attempts {
            Some(max) => policy.with_max_attempts(max),
            None => policy,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            sample_count: self.sample_count,
            retry: self.retry_policy(),
            dims: self.dims(),
        }
    }

    pub fn scorer(&self) -> SimilarityScorer {
        SimilarityScorer::new(self.dims())
            .with_top_k(self.top_k)
            .with_threshold(self.similarity_threshold)
    }

    /// Provider settings for live mode.
    pub fn openai_config(&self) -> Result<OpenAiConfig, ConfigError> {
        let api_key = self
            .openai_api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_OPENAI_API_KEY,
            })?;

        Ok(OpenAiConfig::new(api_key)
            .with_base_url(&self.openai_base_url)
            .with_completion_model(&self.completion_model)
            .with_embedding_model(&self.embedding_model)
            .with_timeout(self.request_timeout))
    }

    /// Store settings for live mode.
    pub fn supabase_config(&self) -> Result<SupabaseConfig, ConfigError> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_SUPABASE_URL,
            })?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_SUPABASE_KEY,
            })?;

        Ok(SupabaseConfig::new(url, key).with_timeout(self.request_timeout))
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
        match Self::parse_optional_string_from_env(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber { name, value }),
            None => Ok(None),
        }
    }
}
