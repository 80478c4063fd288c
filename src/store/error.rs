use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by [`SampleStore`](super::SampleStore) implementations.
pub enum StoreError {
    /// Input rejected before it reached the backend.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Backend unreachable or returned an error. `code` is the SQLSTATE when the backend sent one.
    #[error("store backend error: {message}")]
    Backend {
        code: Option<String>,
        message: String,
    },

    /// Backend answered with data we could not interpret.
    #[error("invalid store response: {reason}")]
    InvalidResponse { reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
