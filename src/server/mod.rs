pub mod api;

use crate::engine::SyncEngine;
use crate::error::Result;
use crate::services::BackendClient;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub type SharedEngine = Arc<SyncEngine>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    pub backend: BackendClient,
}

impl FromRef<AppState> for SharedEngine {
    fn from_ref(app_state: &AppState) -> SharedEngine {
        app_state.engine.clone()
    }
}

impl FromRef<AppState> for BackendClient {
    fn from_ref(app_state: &AppState) -> BackendClient {
        app_state.backend.clone()
    }
}

/// Build the router without binding, so tests can serve it on any listener
pub fn router(app_state: AppState) -> Router {
    // The dashboard UI is served from arbitrary local origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health_handler))
        .route("/snapshot", get(api::snapshot_handler))
        .route("/symbol", post(api::set_symbol_handler))
        .route("/resize", post(api::resize_handler))
        .route("/instruments", get(api::instruments_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server and run until Ctrl-C
pub async fn serve(app_state: AppState, port: u16) -> Result<()> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /snapshot?symbol=BTC/BRL");
    tracing::info!("  POST /symbol {{\"symbol\": \"ETH/BRL\"}}");
    tracing::info!("  POST /resize {{\"surface\": \"price\", \"width\": 640}}");
    tracing::info!("  GET  /instruments");

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
