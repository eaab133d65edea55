use anyhow::{Context, Result};
use clap::Parser;
use crudrest::config::ServerConfig;
use crudrest::demo;
use crudrest::store::InMemoryEntityStore;
use crudrest::web::{CrudState, crud_router};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.log_filter);

    let store = Arc::new(InMemoryEntityStore::new());
    if !config.no_seed {
        demo::seed(store.as_ref()).context("failed to seed demo catalog")?;
    }

    let metadata = demo::metadata().context("failed to build entity metadata")?;
    info!(entities = ?metadata.entity_names(), "entity metadata loaded");
    let state = CrudState::new(metadata, demo::types(), store);
    let app = crud_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        bind_addr = %config.bind_addr,
        seeded = !config.no_seed,
        "crud API started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "unable to install ctrl+c handler");
        std::future::pending::<()>().await;
    }
}
