use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_WORD_LIMIT, MIN_WORD_LIMIT};

use super::error::StoreError;

pub type AssignmentId = i64;
pub type SampleId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub user_id: String,
    pub title: String,
    pub prompt: String,
    pub word_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A generated reference answer and its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleResponse {
    pub id: SampleId,
    pub assignment_id: AssignmentId,
    pub response_text: String,
    pub embedding: Vec<f32>,
}

/// Checks `word_limit` against `[0, 1000]`.
pub fn validate_word_limit(word_limit: i64) -> Result<u32, StoreError> {
    if word_limit < MIN_WORD_LIMIT {
        return Err(StoreError::Validation {
            reason: "word limit cannot be negative".to_string(),
        });
    }
    if word_limit > MAX_WORD_LIMIT {
        return Err(StoreError::Validation {
            reason: format!("word limit cannot be greater than {MAX_WORD_LIMIT}"),
        });
    }
    Ok(word_limit as u32)
}
