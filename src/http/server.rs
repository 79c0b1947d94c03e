//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, body limits, request ID, timeout)
//! - Bind the server to a listener and serve until shutdown

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::DiseaseCatalog;
use crate::config::AppConfig;
use crate::http::handlers::{self, AppState};
use crate::inference::InferenceClient;

/// HTTP server for the crop analysis backend.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and
    /// subsystems.
    pub fn new(config: &AppConfig, inference: InferenceClient, catalog: DiseaseCatalog) -> Self {
        let state = AppState {
            inference: Arc::new(inference),
            catalog: Arc::new(catalog),
            cold_start: Arc::new(AtomicBool::new(true)),
        };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/crop/analyze", post(handlers::analyze))
            .route("/api/crop/health", get(handlers::health))
            .route("/api/crop/crops", get(handlers::crops))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
