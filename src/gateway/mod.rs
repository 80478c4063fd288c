//! HTTP gateway (Axum) for assignment creation and submission comparison.
//!
//! The path `user_id` is trusted as-is; authentication belongs in front of
//! this router.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    AssignmentCreated, CompareRequest, CreateAssignmentRequest, compare_handler,
    create_assignment_handler, get_assignment_handler,
};
pub use state::AppState;

/// Response header carrying a short machine-readable outcome.
pub const PLAGD_STATUS_HEADER: &str = "x-plagd-status";

pub const PLAGD_STATUS_HEALTHY: &str = "healthy";

/// The write routes also answer with a trailing slash, the form existing clients call.
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/user/{user_id}/assignments",
            post(create_assignment_handler),
        )
        .route(
            "/user/{user_id}/assignments/",
            post(create_assignment_handler),
        )
        .route(
            "/user/{user_id}/assignments/{assignment_id}",
            get(get_assignment_handler),
        )
        .route(
            "/user/{user_id}/assignments/{assignment_id}/compare",
            post(compare_handler),
        )
        .route(
            "/user/{user_id}/assignments/{assignment_id}/compare/",
            post(compare_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        PLAGD_STATUS_HEADER,
        HeaderValue::from_static(PLAGD_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
