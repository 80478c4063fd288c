use thiserror::Error;

use crate::retry::RateLimitSignal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by completion and embedding providers.
pub enum ProviderError {
    /// The provider asked us to slow down (HTTP 429). Retryable.
    #[error("{provider} rate limited the request")]
    RateLimited {
        /// Provider name.
        provider: &'static str,
    },

    /// The request could not be sent or returned a non-success status.
    #[error(
        "{provider} request failed{}: {message}",
        .status.map(|s| format!(" ({s})")).unwrap_or_default()
    )]
    RequestFailed {
        /// Provider name.
        provider: &'static str,
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Error message or response body.
        message: String,
    },

    /// The provider answered with a body we could not use.
    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse {
        /// Provider name.
        provider: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { provider }
            | ProviderError::RequestFailed { provider, .. }
            | ProviderError::InvalidResponse { provider, .. } => provider,
        }
    }
}

impl RateLimitSignal for ProviderError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}
