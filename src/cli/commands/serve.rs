use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::config::{config, AppConfig};
use crate::database::manager::DatabaseManager;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::Store;

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Keep records in memory instead of PostgreSQL")]
    pub memory: bool,

    #[arg(long, help = "Address to bind (defaults to TRACKER_HOST or config)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to bind (defaults to TRACKER_PORT or config)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config();
    info!("Starting job tracker in {:?} mode", config.environment);

    let store = open_store(args.memory, config).await?;
    let app = app(AppState::new(store), config);

    let bind_addr = format!(
        "{}:{}",
        args.host.as_deref().unwrap_or(&config.api.host),
        args.port.unwrap_or(config.api.port)
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Job tracker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    DatabaseManager::close().await;
    info!("Server stopped");
    Ok(())
}

/// PostgreSQL when a database is configured, otherwise the in-memory store.
pub async fn open_store(memory: bool, config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if memory {
        info!("Using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if config.database.url.is_none() {
        warn!("DATABASE_URL is not set, using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect().await.context("Failed to connect to the database")?;
    if config.database.auto_migrate {
        store.ensure_schema().await.context("Failed to create database tables")?;
    }
    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
