//! Persistence of assignments and generated sample responses.
//!
//! Samples are append-only: the pipeline inserts them concurrently and nothing
//! ever updates one in place.
//!
//! - [`InMemorySampleStore`] backs development mode and tests.
//! - [`SupabaseSampleStore`] talks to a Supabase/PostgREST database.

pub mod error;
pub mod memory;
pub mod model;
pub mod supabase;


use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use memory::InMemorySampleStore;
pub use model::{Assignment, AssignmentId, SampleId, SampleResponse, validate_word_limit};
pub use supabase::{SupabaseConfig, SupabaseSampleStore};

#[async_trait]
/// Storage for assignments and their sample responses.
pub trait SampleStore: Send + Sync {
    /// Stores a new assignment. Fails with [`StoreError::Validation`] if
    /// `word_limit` is outside `[0, 1000]`.
    async fn create_assignment(
        &self,
        user_id: &str,
        title: &str,
        prompt: &str,
        word_limit: i64,
    ) -> StoreResult<AssignmentId>;

    /// Fetches an assignment owned by `user_id`.
    async fn get_assignment(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
    ) -> StoreResult<Assignment>;

    /// Appends a sample response. Fails with [`StoreError::NotFound`] if the
    /// assignment does not exist.
    async fn save_sample(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
        text: &str,
        embedding: &[f32],
    ) -> StoreResult<SampleId>;

    /// All samples for an assignment, in insertion order. Unknown assignments
    /// yield an empty list.
    async fn list_samples(&self, assignment_id: AssignmentId) -> StoreResult<Vec<SampleResponse>>;

    fn backend_name(&self) -> &'static str;
}
