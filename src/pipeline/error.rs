use thiserror::Error;

use crate::constants::DimValidationError;
use crate::provider::ProviderError;
use crate::store::{AssignmentId, StoreError};

use super::types::GenerationReport;

/// Terminal failure of a single embed + persist sibling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("embedding has the wrong shape: {0}")]
    Shape(#[source] DimValidationError),

    #[error("saving sample failed: {0}")]
    Store(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The batched completion call failed, so no sibling was started.
    #[error("completion request for assignment {assignment_id} failed: {source}")]
    Completion {
        assignment_id: AssignmentId,
        #[source]
        source: ProviderError,
    },

    /// At least one sibling failed. Samples listed in the report as stored
    /// remain persisted.
    #[error(
        "{} of {} samples failed for assignment {}",
        .0.failure_count(),
        .0.total,
        .0.assignment_id
    )]
    SamplesFailed(GenerationReport),
}

impl GenerationError {
    pub fn assignment_id(&self) -> AssignmentId {
        match self {
            GenerationError::Completion { assignment_id, .. } => *assignment_id,
            GenerationError::SamplesFailed(report) => report.assignment_id,
        }
    }

    /// The partial report, when siblings ran.
    pub fn report(&self) -> Option<&GenerationReport> {
        match self {
            GenerationError::SamplesFailed(report) => Some(report),
            GenerationError::Completion { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("generation queue is full")]
    Full,

    #[error("generation queue is closed")]
    Closed,
}
