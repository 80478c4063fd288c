use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::SampleStore;
use super::error::{StoreError, StoreResult};
use super::model::{Assignment, AssignmentId, SampleId, SampleResponse, validate_word_limit};

#[derive(Debug, Default)]
struct Tables {
    last_assignment_id: AssignmentId,
    last_sample_id: SampleId,
    assignments: BTreeMap<AssignmentId, Assignment>,
    samples: Vec<SampleResponse>,
}

/// Process-local store. Ids start at 1 and increase monotonically.
#[derive(Debug, Default)]
pub struct InMemorySampleStore {
    tables: RwLock<Tables>,
}

impl InMemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignment_count(&self) -> usize {
        self.tables.read().assignments.len()
    }

    pub fn sample_count(&self, assignment_id: AssignmentId) -> usize {
        self.tables
            .read()
            .samples
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .count()
    }
}

#[async_trait]
impl SampleStore for InMemorySampleStore {
    async fn create_assignment(
        &self,
        user_id: &str,
        title: &str,
        prompt: &str,
        word_limit: i64,
    ) -> StoreResult<AssignmentId> {
        let word_limit = validate_word_limit(word_limit)?;

        let mut tables = self.tables.write();
        tables.last_assignment_id += 1;
        let id = tables.last_assignment_id;
        tables.assignments.insert(
            id,
            Assignment {
                id,
                user_id: user_id.to_string(),
                title: title.to_string(),
                prompt: prompt.to_string(),
                word_limit,
                created_at: Some(Utc::now()),
            },
        );

        debug!(assignment_id = id, user_id, "Assignment stored in memory");
        Ok(id)
    }

    async fn get_assignment(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
    ) -> StoreResult<Assignment> {
        self.tables
            .read()
            .assignments
            .get(&assignment_id)
            .filter(|a| a.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "assignment",
                id: assignment_id,
            })
    }

    async fn save_sample(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
        text: &str,
        embedding: &[f32],
    ) -> StoreResult<SampleId> {
        let mut tables = self.tables.write();
        if !tables.assignments.contains_key(&assignment_id) {
            return Err(StoreError::NotFound {
                entity: "assignment",
                id: assignment_id,
            });
        }

        tables.last_sample_id += 1;
        let id = tables.last_sample_id;
        tables.samples.push(SampleResponse {
            id,
            assignment_id,
            response_text: text.to_string(),
            embedding: embedding.to_vec(),
        });

        debug!(sample_id = id, assignment_id, user_id, "Sample stored in memory");
        Ok(id)
    }

    async fn list_samples(&self, assignment_id: AssignmentId) -> StoreResult<Vec<SampleResponse>> {
        Ok(self
            .tables
            .read()
            .samples
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
