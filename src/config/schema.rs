//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! service. All types derive Serde traits for deserialization from config
//! files, and every field has a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the crop analysis backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound HTTP server settings.
    pub server: ServerConfig,

    /// Outbound inference service client settings.
    pub inference: InferenceConfig,

    /// Crop-disease knowledge catalog settings.
    pub catalog: CatalogConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Inbound HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Whole-request deadline. Must leave room for a cold-start
    /// prediction plus its retries.
    pub request_timeout_secs: u64,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Outbound inference client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the inference service (e.g., "http://localhost:5001").
    pub base_url: String,

    /// Maximum attempts per logical call (including the first).
    pub max_retries: u32,

    /// Backoff before the first retry; doubles each attempt.
    pub base_backoff_ms: u64,

    /// Upper bound on a single backoff delay.
    pub max_backoff_ms: u64,

    /// Per-attempt timeout for warm requests.
    pub normal_timeout_ms: u64,

    /// Per-attempt timeout when the remote is likely cold-starting
    /// (free-tier hosts take 40-50s to wake and load weights).
    pub cold_start_timeout_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            max_retries: 3,
            base_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            normal_timeout_ms: 30_000,
            cold_start_timeout_ms: 60_000,
        }
    }
}

/// Crop-disease catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the crop → disease → guidance JSON file.
    pub data_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/crop_disease_data.json"),
        }
    }
}
