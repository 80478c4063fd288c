use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use super::error::QueueError;
use super::generation::SampleGenerationPipeline;
use super::sink::FailureSink;
use super::types::GenerationJob;

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Sending half: enqueue never waits.
#[derive(Debug, Clone)]
pub struct GenerationQueue {
    tx: mpsc::Sender<GenerationJob>,
}

impl GenerationQueue {
    pub fn enqueue(&self, job: GenerationJob) -> Result<(), QueueError> {
        let assignment_id = job.assignment_id;
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })?;
        debug!(assignment_id, "Generation job enqueued");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half: runs every job on its own task.
pub struct GenerationWorker {
    rx: mpsc::Receiver<GenerationJob>,
    pipeline: Arc<SampleGenerationPipeline>,
    sink: Arc<dyn FailureSink>,
}

impl GenerationWorker {
    /// Drains the queue until every [`GenerationQueue`] handle is dropped,
    /// then waits for in-flight jobs.
    pub async fn run(mut self) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => {
                        let pipeline = self.pipeline.clone();
                        let sink = self.sink.clone();
                        in_flight.spawn(run_job(pipeline, sink, job));
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_join(joined);
                }
            }
        }

        info!(
            in_flight = in_flight.len(),
            "Generation queue closed, waiting for in-flight jobs"
        );
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
    }
}

async fn run_job(
    pipeline: Arc<SampleGenerationPipeline>,
    sink: Arc<dyn FailureSink>,
    job: GenerationJob,
) {
    match pipeline.run(&job).await {
        Ok(report) => debug!(
            assignment_id = report.assignment_id,
            stored = report.stored_count(),
            "Generation job finished"
        ),
        Err(err) => sink.report(&job, &err),
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Generation job panicked");
    }
}

/// Creates a connected queue/worker pair.
pub fn generation_channel(
    pipeline: Arc<SampleGenerationPipeline>,
    sink: Arc<dyn FailureSink>,
    capacity: usize,
) -> (GenerationQueue, GenerationWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        GenerationQueue { tx },
        GenerationWorker { rx, pipeline, sink },
    )
}

/// Creates a queue and runs its worker on the tokio runtime.
pub fn spawn_generation_worker(
    pipeline: Arc<SampleGenerationPipeline>,
    sink: Arc<dyn FailureSink>,
    capacity: usize,
) -> (GenerationQueue, JoinHandle<()>) {
    let (queue, worker) = generation_channel(pipeline, sink, capacity);
    (queue, tokio::spawn(worker.run()))
}
