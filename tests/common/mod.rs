//! Test server harness.
//!
//! Spawns the real router on a loopback port with the in-memory store and
//! scripted providers from the `mock` feature.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plagd::comparison::SubmissionScoringService;
use plagd::completion::MockCompletionClient;
use plagd::constants::DimConfig;
use plagd::embedding::MockEmbeddingClient;
use plagd::gateway::{AppState, create_router_with_state};
use plagd::pipeline::{
    PipelineConfig, RecordingFailureSink, SampleGenerationPipeline, spawn_generation_worker,
};
use plagd::retry::{RecordingSleeper, RetryPolicy};
use plagd::scoring::SimilarityScorer;
use plagd::store::{AssignmentId, InMemorySampleStore};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const TEST_DIM: usize = 8;

const STARTUP_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<InMemorySampleStore>,
    pub completions: Arc<MockCompletionClient>,
    pub embeddings: Arc<MockEmbeddingClient>,
    pub sleeper: Arc<RecordingSleeper>,
    pub sink: Arc<RecordingFailureSink>,
    server_handle: JoinHandle<()>,
    worker_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    /// Stops the server and waits for queued generation jobs to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.server_handle).await;
        let _ = (&mut self.worker_handle).await;
    }

    /// Polls until `assignment_id` has `expected` samples.
    pub async fn wait_for_samples(&self, assignment_id: AssignmentId, expected: usize) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < STARTUP_WAIT_TIMEOUT {
            if self.store.sample_count(assignment_id) >= expected {
                return true;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        false
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(addr: SocketAddr) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();
    loop {
        if start.elapsed() > STARTUP_WAIT_TIMEOUT {
            return Err(ServerStartupError::Timeout);
        }
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }
}

/// Spawns a server whose providers answer from the given scripts.
pub async fn spawn_test_server(
    completions: MockCompletionClient,
    embeddings: MockEmbeddingClient,
) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    let store = Arc::new(InMemorySampleStore::new());
    let completions = Arc::new(completions);
    let embeddings = Arc::new(embeddings);
    let sleeper = Arc::new(RecordingSleeper::new());
    let sink = Arc::new(RecordingFailureSink::new());

    let pipeline = SampleGenerationPipeline::new(
        completions.clone(),
        embeddings.clone(),
        store.clone(),
        PipelineConfig {
            sample_count: 2,
            retry: RetryPolicy::new(Duration::from_secs(2)),
            dims: DimConfig::new(TEST_DIM),
        },
    )
    .with_sleeper(sleeper.clone());
    let (queue, worker_handle) = spawn_generation_worker(Arc::new(pipeline), sink.clone(), 8);

    let scoring = Arc::new(SubmissionScoringService::new(
        embeddings.clone(),
        store.clone(),
        SimilarityScorer::new(DimConfig::new(TEST_DIM)),
    ));
    let app = create_router_with_state(AppState::new(store.clone(), queue, scoring));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(addr).await?;

    Ok(TestServer {
        addr,
        store,
        completions,
        embeddings,
        sleeper,
        sink,
        server_handle,
        worker_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// Unit vector along `axis`, scaled.
pub fn axis_vector(axis: usize, scale: f32) -> Vec<f32> {
    let mut v = vec![0.0; TEST_DIM];
    v[axis] = scale;
    v
}
