//! HTTP server setup

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::MockError;
use crate::server::handlers::{
    auth_callback_handler, commit_handler, deploy_handler, generate_handler, status_handler,
    status_without_id_handler, verify_handler,
};
use crate::server::state::MockState;
use crate::server::ws::ws_handler;

/// Routes of the mock API
pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        // Code generation and upload
        .route("/api/generate", post(generate_handler))
        .route("/api/deploy", post(deploy_handler))
        .route("/api/commit", post(commit_handler))
        // Authentication
        .route("/api/auth/callback", get(auth_callback_handler))
        .route("/api/auth/verify", get(verify_handler))
        // Deployment progress
        .route("/api/status/", get(status_without_id_handler))
        .route("/api/status/{deployment_id}", get(status_handler))
        .route("/ws", get(ws_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server, returning the bound address
pub async fn serve(
    addr: &str,
    state: Arc<MockState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, JoinHandle<Result<(), MockError>>), MockError> {
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| MockError::ServerError(format!("failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    info!("Mock Backend.im API listening on {}", local_addr);
    info!("WebSocket endpoint: ws://{}/ws", local_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| MockError::ServerError(e.to_string()))
    });

    Ok((local_addr, handle))
}
