use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod api;
mod catalog;
mod config;
mod db;
mod fixtures;
mod predictions;
mod standings;

use api::AppState;
use config::Config;
use db::{Database, KeyValueStore};
use fixtures::{start_fixture_refresh, FixtureSource, FootballApi};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Database::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    info!("Database opened: {}", config.database_path);

    let backend = Arc::new(FootballApi::new(&config.api_base_url, config.request_timeout())?);
    info!("Fixtures backend: {}", config.api_base_url);

    if config.refresh_on_start {
        let targets = config.refresh_targets();
        let source: Arc<dyn FixtureSource> = backend.clone();
        let store: Arc<dyn KeyValueStore> = Arc::new(db.clone());
        start_fixture_refresh(source, store, targets, config.refresh_interval());
    } else {
        info!("Background fixture refresh disabled");
    }

    let app = api::router(AppState::new(
        db,
        backend.clone(),
        backend,
        config.refresh_interval(),
    ));
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Blocks until shutdown
    axum::serve(listener, app).await?;

    Ok(())
}
