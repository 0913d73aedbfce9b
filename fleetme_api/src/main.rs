use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use fleetme_api::{app, api_router, config::Config, state::AppState};
use fleetme_store::SqliteFleetStore;
use tracing::{Level, info};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    if std::env::args().any(|a| a == "--generate-openapi") {
        use std::fs::File;
        use std::io::Write;

        let (_, api) = api_router();
        let mut file = File::create("schemas/openapi.json").unwrap();
        let spec = serde_json::to_string_pretty(&api).unwrap();
        file.write_all(spec.as_bytes()).unwrap();
        info!("OpenAPI specification has been written to openapi.json");
        return Ok(());
    }

    let config = Config::from_env()?;

    let store = SqliteFleetStore::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to open the database")?;
    store.migrate().await.context("failed to run migrations")?;

    let state = Arc::new(AppState { store });
    let app = app(state.clone());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "listening");

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.store.close().await;
    info!("database closed, bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
}
