//! Sample generation: one batched completion call, then per-sample
//! embed + persist fanned out concurrently.
//!
//! Generation runs in the background. Request handlers push a
//! [`GenerationJob`] onto a [`GenerationQueue`] and return; a
//! [`GenerationWorker`] drains the queue and hands run-level failures to a
//! [`FailureSink`], since the original caller is long gone by then.
//!
//! Failure semantics:
//! - A rate-limited provider call is retried per [`RetryPolicy`](crate::retry::RetryPolicy).
//! - Any other sibling failure is recorded, the other siblings keep running,
//!   and nothing already stored is rolled back. A run with one or more failed
//!   siblings ends in [`GenerationError::SamplesFailed`], which still lists
//!   the samples that landed.

pub mod error;
pub mod generation;
pub mod sink;
pub mod types;
pub mod worker;


pub use error::{GenerationError, QueueError, SampleError};
pub use generation::{PipelineConfig, SampleGenerationPipeline};
#[cfg(any(test, feature = "mock"))]
pub use sink::RecordingFailureSink;
pub use sink::{FailureSink, TracingFailureSink};
pub use types::{GenerationJob, GenerationReport, SampleFailure, StoredSample};
pub use worker::{
    DEFAULT_QUEUE_CAPACITY, GenerationQueue, GenerationWorker, generation_channel,
    spawn_generation_worker,
};
