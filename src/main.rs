//! Crop disease analysis backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 CROPSIGHT                     │
//!                        │                                               │
//!   Client upload        │  ┌─────────┐    ┌────────────┐               │
//!   ─────────────────────┼─▶│  http   │───▶│ inference  │──────────────▶│──── ML inference
//!                        │  │ server  │    │  client    │  retry/backoff│     service
//!                        │  └────┬────┘    └────────────┘               │
//!                        │       │                                      │
//!                        │       ▼                                      │
//!                        │  ┌─────────┐   merged into the response      │
//!                        │  │ catalog │   (treatment, prevention, ...)  │
//!                        │  └─────────┘                                 │
//!                        │                                              │
//!                        │  config · lifecycle · resilience · tracing   │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cropsight::catalog::DiseaseCatalog;
use cropsight::config::{load_config, AppConfig};
use cropsight::http::HttpServer;
use cropsight::inference::InferenceClient;
use cropsight::lifecycle::Shutdown;

/// Config path from `CROPSIGHT_CONFIG`, falling back to `cropsight.toml`
/// next to the binary, falling back to defaults.
fn resolve_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("CROPSIGHT_CONFIG") {
        return Ok(load_config(&PathBuf::from(path))?);
    }

    let default_path = PathBuf::from("cropsight.toml");
    if default_path.exists() {
        return Ok(load_config(&default_path)?);
    }

    tracing::info!("No config file found, using defaults");
    Ok(AppConfig::default())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropsight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("cropsight v0.1.0 starting");

    let config = resolve_config()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        inference_url = %config.inference.base_url,
        max_retries = config.inference.max_retries,
        normal_timeout_ms = config.inference.normal_timeout_ms,
        cold_start_timeout_ms = config.inference.cold_start_timeout_ms,
        "Configuration loaded"
    );

    let catalog = DiseaseCatalog::load(&config.catalog.data_path)?;
    let inference = InferenceClient::new(&config.inference)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received");
        }
        shutdown.trigger();
    });

    let server = HttpServer::new(&config, inference, catalog);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
