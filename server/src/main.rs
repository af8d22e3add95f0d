//! Replication Server - keeps a PostgreSQL product catalog in step with a
//! remote snapshot.
//!
//! A background task runs a replication cycle on a fixed interval using the
//! replication-engine reconciliation logic. Cycles can also be triggered over
//! HTTP, and their outcomes inspected.

mod client;
mod config;
mod db;
mod error;
mod metrics;
mod routes;
mod scheduler;

use crate::client::HttpProductClient;
use crate::config::Config;
use crate::db::{PgProductRepository, Pool};
use crate::metrics::ReplicationMetrics;
use axum::Router;
use replication_engine::Service;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The service wired to its production collaborators.
pub type ReplicationService = Service<HttpProductClient, PgProductRepository, ReplicationMetrics>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub service: Arc<ReplicationService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replication_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        "Starting Replication Server on {}:{}",
        config.host,
        config.port
    );

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // Wire the replication service
    let client = HttpProductClient::new(config.source_url.clone(), config.source_timeout)?;
    let service = Arc::new(Service::new(
        client,
        PgProductRepository::new(pool.clone()),
        ReplicationMetrics::new(),
    ));

    tracing::info!(
        source = %config.source_url,
        interval = ?config.replication_interval,
        "Scheduling replication"
    );
    let replication_task = scheduler::spawn(service.clone(), config.replication_interval);

    // Build application state
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        service,
    };

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    replication_task.abort();
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolve when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
