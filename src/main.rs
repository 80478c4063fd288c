//! plagd HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use plagd::comparison::SubmissionScoringService;
use plagd::completion::{CompletionClient, OpenAiCompletionClient, StubCompletionClient};
use plagd::config::{Config, ProviderMode};
use plagd::embedding::{EmbeddingClient, OpenAiEmbeddingClient, StubEmbeddingClient};
use plagd::gateway::{AppState, create_router_with_state};
use plagd::pipeline::{SampleGenerationPipeline, TracingFailureSink, spawn_generation_worker};
use plagd::provider::OpenAiTransport;
use plagd::store::{InMemorySampleStore, SampleStore, SupabaseSampleStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

struct Collaborators {
    completions: Arc<dyn CompletionClient>,
    embeddings: Arc<dyn EmbeddingClient>,
    store: Arc<dyn SampleStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        mode = %config.mode,
        "plagd starting"
    );

    let Collaborators {
        completions,
        embeddings,
        store,
    } = build_collaborators(&config)?;

    tracing::info!(
        completions = completions.provider_name(),
        embeddings = embeddings.provider_name(),
        store = store.backend_name(),
        embedding_dim = config.embedding_dim,
        "Collaborators ready"
    );

    let pipeline = Arc::new(SampleGenerationPipeline::new(
        completions,
        embeddings.clone(),
        store.clone(),
        config.pipeline_config(),
    ));
    let (queue, worker) = spawn_generation_worker(
        pipeline,
        Arc::new(TracingFailureSink),
        config.queue_capacity,
    );

    let scoring = Arc::new(SubmissionScoringService::new(
        embeddings,
        store.clone(),
        config.scorer(),
    ));
    let app = create_router_with_state(AppState::new(store, queue, scoring));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last queue handle; the worker now finishes what it has.
    tracing::info!("Waiting for in-flight sample generation");
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Generation worker terminated abnormally");
    }

    tracing::info!("plagd shutdown complete");
    Ok(())
}

fn build_collaborators(config: &Config) -> anyhow::Result<Collaborators> {
    match config.mode {
        ProviderMode::Dev => {
            tracing::warn!("PLAGD_ENV=dev: using stub providers and the in-memory store");
            Ok(Collaborators {
                completions: Arc::new(StubCompletionClient),
                embeddings: Arc::new(StubEmbeddingClient::new(config.embedding_dim)),
                store: Arc::new(InMemorySampleStore::new()),
            })
        }
        ProviderMode::Live => {
            let transport = OpenAiTransport::new(config.openai_config()?)?;
            let store = SupabaseSampleStore::new(config.supabase_config()?)?;
            Ok(Collaborators {
                completions: Arc::new(OpenAiCompletionClient::new(transport.clone())),
                embeddings: Arc::new(OpenAiEmbeddingClient::new(
                    transport,
                    config.embedding_dim,
                )),
                store: Arc::new(store),
            })
        }
    }
}

async fn run_health_check() -> i32 {
    let port = std::env::var("PLAGD_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{port}/healthz");

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
