//! `Quill` server entry point.
//!
//! Opens the document and credential directories, makes sure the credential
//! record exists, then starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use quill_storage::FsBackend;

use quill_server::config::ServerConfig;
use quill_server::routes::build_router;
use quill_server::session::SessionConfig;
use quill_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        data_dir = %config.data_dir.display(),
        credentials_dir = %config.credentials_dir.display(),
        "Quill starting"
    );

    let state = build_app_state(&config).await?;
    let app = build_router(state);

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Quill server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Quill server stopped");
    Ok(())
}

/// Open both storage roots and build the shared application state.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let documents = Arc::new(
        FsBackend::open(&config.data_dir).with_context(|| {
            format!(
                "failed to open document directory {}",
                config.data_dir.display()
            )
        })?,
    );
    let credentials = Arc::new(
        FsBackend::open(&config.credentials_dir).with_context(|| {
            format!(
                "failed to open credentials directory {}",
                config.credentials_dir.display()
            )
        })?,
    );

    let sessions = SessionConfig::from_secret(config.session_secret.as_deref(), config.session_ttl)
        .with_secure(config.cookie_secure);
    let state = AppState::new(documents, credentials).with_sessions(sessions);

    if state
        .guard
        .credentials()
        .initialize()
        .await
        .context("failed to initialize the credential store")?
    {
        info!("created empty credential store");
    }

    Ok(Arc::new(state))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
