use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::comparison::SimilarityResult;
use crate::pipeline::GenerationJob;
use crate::store::{Assignment, AssignmentId, validate_word_limit};

use super::error::GatewayError;
use super::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub prompt: String,
    pub word_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentCreated {
    pub assignment_id: AssignmentId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub text: String,
}

/// Decodes a JSON body, reporting schema problems as [`GatewayError::InvalidRequest`].
fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid request schema: {e}")))
}

/// Stores the assignment and queues sample generation without waiting for it.
#[instrument(skip(state, body))]
pub async fn create_assignment_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AssignmentCreated>, GatewayError> {
    let request: CreateAssignmentRequest = parse_body(body)?;
    let word_limit = validate_word_limit(request.word_limit)?;

    let assignment_id = state
        .store
        .create_assignment(
            &user_id,
            &request.title,
            &request.prompt,
            request.word_limit,
        )
        .await?;

    let job = GenerationJob::new(user_id, assignment_id, request.prompt, word_limit);
    if let Err(e) = state.queue.enqueue(job) {
        warn!(assignment_id, error = %e, "Assignment stored but generation was not queued");
        return Err(e.into());
    }

    info!(assignment_id, "Assignment created, sample generation queued");
    Ok(Json(AssignmentCreated { assignment_id }))
}

#[instrument(skip(state))]
pub async fn get_assignment_handler(
    State(state): State<AppState>,
    Path((user_id, assignment_id)): Path<(String, AssignmentId)>,
) -> Result<Json<Assignment>, GatewayError> {
    let assignment = state.store.get_assignment(&user_id, assignment_id).await?;
    Ok(Json(assignment))
}

/// Scores a submission against the assignment's samples.
#[instrument(skip(state, body))]
pub async fn compare_handler(
    State(state): State<AppState>,
    Path((user_id, assignment_id)): Path<(String, AssignmentId)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Vec<SimilarityResult>>, GatewayError> {
    let request: CompareRequest = parse_body(body)?;
    debug!(text_len = request.text.len(), "Comparing submission");

    let results = state
        .scoring
        .score_submission(&user_id, assignment_id, &request.text)
        .await?;
    Ok(Json(results))
}
