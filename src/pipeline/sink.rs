use tracing::error;

use super::error::GenerationError;
use super::types::GenerationJob;

/// Receives generation failures that have no caller to return to.
pub trait FailureSink: Send + Sync {
    fn report(&self, job: &GenerationJob, error: &GenerationError);
}

/// Emits each failure as a structured `error!` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn report(&self, job: &GenerationJob, err: &GenerationError) {
        match err.report() {
            Some(report) => {
                let reasons: Vec<String> = report
                    .failures
                    .iter()
                    .map(|f| format!("#{}: {}", f.index, f.error))
                    .collect();
                error!(
                    assignment_id = job.assignment_id,
                    user_id = %job.user_id,
                    failed = report.failure_count(),
                    stored = report.stored_count(),
                    total = report.total,
                    stored_ids = ?report.sample_ids(),
                    reasons = ?reasons,
                    "Sample generation partially failed"
                );
            }
            None => {
                error!(
                    assignment_id = job.assignment_id,
                    user_id = %job.user_id,
                    error = %err,
                    "Sample generation failed"
                );
            }
        }
    }
}

/// Keeps every reported failure for inspection in tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct RecordingFailureSink {
    failures: parking_lot::Mutex<Vec<(GenerationJob, GenerationError)>>,
}

#[cfg(any(test, feature = "mock"))]
impl RecordingFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<(GenerationJob, GenerationError)> {
        self.failures.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

#[cfg(any(test, feature = "mock"))]
impl FailureSink for RecordingFailureSink {
    fn report(&self, job: &GenerationJob, err: &GenerationError) {
        self.failures.lock().push((job.clone(), err.clone()));
    }
}
