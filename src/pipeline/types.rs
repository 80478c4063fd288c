use crate::store::{AssignmentId, SampleId};

use super::error::SampleError;

/// Work item for one assignment's sample generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub user_id: String,
    pub assignment_id: AssignmentId,
    pub prompt: String,
    pub word_limit: u32,
}

impl GenerationJob {
    pub fn new(
        user_id: impl Into<String>,
        assignment_id: AssignmentId,
        prompt: impl Into<String>,
        word_limit: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            assignment_id,
            prompt: prompt.into(),
            word_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    /// Position of the completion in the provider's answer.
    pub index: usize,
    pub sample_id: SampleId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleFailure {
    /// Position of the completion in the provider's answer.
    pub index: usize,
    pub error: SampleError,
}

/// Outcome of one generation run, sibling by sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub assignment_id: AssignmentId,
    /// Completions received from the provider.
    pub total: usize,
    pub stored: Vec<StoredSample>,
    pub failures: Vec<SampleFailure>,
}

impl GenerationReport {
    pub fn stored_count(&self) -> usize {
        self.stored.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn sample_ids(&self) -> Vec<SampleId> {
        self.stored.iter().map(|s| s.sample_id).collect()
    }
}
