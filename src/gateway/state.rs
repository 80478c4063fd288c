use std::sync::Arc;

use crate::comparison::SubmissionScoringService;
use crate::pipeline::GenerationQueue;
use crate::store::SampleStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SampleStore>,

    /// Hands new assignments to the background generation worker.
    pub queue: GenerationQueue,

    pub scoring: Arc<SubmissionScoringService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SampleStore>,
        queue: GenerationQueue,
        scoring: Arc<SubmissionScoringService>,
    ) -> Self {
        Self {
            store,
            queue,
            scoring,
        }
    }
}
