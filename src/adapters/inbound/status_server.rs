//! Status API Server
//!
//! Read-only HTTP view of the status board for external indicators and
//! monitoring.

use crate::adapters::outbound::{StatusBoard, StatusSnapshot};
use crate::infrastructure::ShutdownController;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Status API state.
#[derive(Clone)]
pub struct StatusState {
    pub board: Arc<StatusBoard>,
}

/// Status API server.
pub struct StatusServer {
    listen_addr: String,
    state: StatusState,
}

impl StatusServer {
    pub fn new(listen_addr: String, board: Arc<StatusBoard>) -> Self {
        Self {
            listen_addr,
            state: StatusState { board },
        }
    }

    /// Build the router without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/status", get(status_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until shutdown is initiated.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("status API listening on {}", self.listen_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn status_handler(State(state): State<StatusState>) -> Json<StatusSnapshot> {
    Json(state.board.snapshot())
}
