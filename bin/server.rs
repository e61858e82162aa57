// Cinema Catalog - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cinema_catalog::api::{router, AppState};
use cinema_catalog::config::ServerConfig;
use cinema_catalog::logging::init_tracing;
use cinema_catalog::open_database;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.common.log_level);

    let db_path = &config.common.database;
    let conn = open_database(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let app = router(AppState::new(conn));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(addr = %config.bind, version = cinema_catalog::VERSION, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
