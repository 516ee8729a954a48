//! Demo employee service backed by the cache-aside layer
//!
//! Serves a slow employee directory through the cache over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_aside::api::create_router;
use cache_aside::cache::{ttl_from_minutes, CacheService};
use cache_aside::directory::EmployeeDirectory;
use cache_aside::store::{Connector, MemoryConnector, RedisConnector};
use cache_aside::{spawn_sweep_task, AppState, Backend, Config};

/// Simulated cost of a directory lookup
const DIRECTORY_LATENCY: Duration = Duration::from_millis(250);

/// Main entry point for the demo service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the store connector (no connection is opened yet)
/// 4. Start the expiry sweep when running on the in-process store
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_aside=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache-aside demo service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, default_ttl={}min, port={}",
        config.backend, config.default_ttl_minutes, config.server_port
    );

    let default_ttl = ttl_from_minutes(config.default_ttl_minutes)
        .context("invalid DEFAULT_TTL_MINUTES")?;

    let mut sweeper: Option<JoinHandle<()>> = None;
    let connector: Arc<dyn Connector> = match config.backend {
        Backend::Redis => {
            info!("Using Redis backend");
            Arc::new(RedisConnector::new(config.redis_configuration.clone()))
        }
        Backend::Memory => {
            let store = MemoryConnector::new(config.memory_nodes, config.max_entries);
            info!("Using in-process store with {} node(s)", config.memory_nodes);
            sweeper = Some(spawn_sweep_task(store.clone(), config.sweep_interval));
            Arc::new(store)
        }
    };

    let state = AppState::new(
        CacheService::with_default_ttl(connector, default_ttl),
        EmployeeDirectory::seeded(DIRECTORY_LATENCY),
    );
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeper.
async fn shutdown_signal(sweeper: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
