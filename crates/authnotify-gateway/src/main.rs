//! authnotify gateway
//!
//! - WebSocket endpoint: /v1/ws?token=... (alias: /api/notifications/ws)
//! - Every admitted client receives every published notification
//! - Publish endpoint for out-of-process producers: POST /v1/publish
//! - Graceful drain on SIGINT/SIGTERM

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use authnotify_core::error::{NotifyError, Result};
use authnotify_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        NotifyError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "authnotify-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| NotifyError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| NotifyError::Internal(format!("server failed: {e}")))?;

    tracing::info!("authnotify-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
    state.begin_drain();
}
