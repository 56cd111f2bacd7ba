//! # Till Server
//!
//! Binary entry point: config, database, state, serve.

use tokio::net::TcpListener;
use tracing::info;

use till_db::{Database, DbConfig};
use till_server::{build_router, init_tracing, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Till POS server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        bind = %config.server.bind_address(),
        db_path = %config.database.path.display(),
        spool_dir = %config.printing.spool_dir.display(),
        "Configuration loaded"
    );

    // Connect to database
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let db = Database::new(
        DbConfig::new(config.database.path.clone())
            .max_connections(config.database.max_connections),
    )
    .await?;
    info!("Bill store open");

    let addr = config.server.bind_address();
    let state = AppState::new(config, db.clone())?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
