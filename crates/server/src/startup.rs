use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::env::ensure_store_dir;
use configs::AppConfig;
use service::{RedbTodoStore, TodoService};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Any origin, any method; browsers talk to the API directly.
pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the store named by `cfg` and wrap it in the service.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    ensure_store_dir(&cfg.storage.path).await?;
    let store = RedbTodoStore::open(&cfg.storage.path)?;
    info!(store = %store.path().display(), id_policy = ?cfg.storage.id_policy, "todo service ready");
    let todos = TodoService::new(Arc::new(store), cfg.storage.id_policy);
    Ok(AppState::new(todos))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    cfg.bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.bind_addr())))
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Serve `app` until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), StartupError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Any(e.into()))
}

/// Public entry: open the store, build the app and run the HTTP server.
/// The store handle is released when the router is dropped after shutdown.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let addr = bind_addr(&cfg)?;
    let state = build_state(&cfg).await?;
    let app = routes::build_router(state, build_cors());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(anyhow::anyhow!("cannot bind {addr}: {e}")))?;
    info!(%addr, store = %cfg.storage.path.display(), "todo server listening");
    serve(listener, app).await?;
    info!("server stopped; store closed");
    Ok(())
}
