use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::comparison::ComparisonError;
use crate::pipeline::QueueError;
use crate::provider::ProviderError;
use crate::store::StoreError;

use super::PLAGD_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Comparison(#[from] ComparisonError),

    #[error("{0}")]
    Queue(#[from] QueueError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Store(err) => store_status(err),
            GatewayError::Comparison(err) => match err {
                ComparisonError::Embedding(ProviderError::RateLimited { .. }) => {
                    (StatusCode::TOO_MANY_REQUESTS, "rate_limited")
                }
                ComparisonError::Embedding(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
                ComparisonError::EmbeddingShape { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "embedding_shape_error")
                }
                ComparisonError::Store(err) => store_status(err),
                ComparisonError::Scoring(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "scoring_error")
                }
            },
            GatewayError::Queue(_) => (StatusCode::SERVICE_UNAVAILABLE, "queue_unavailable"),
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::Validation { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        StoreError::Backend { .. } | StoreError::InvalidResponse { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, plagd_status) = self.status();

        let mut headers = HeaderMap::new();
        headers.insert(PLAGD_STATUS_HEADER, HeaderValue::from_static(plagd_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
