//! Crop disease analysis backend.
//!
//! Accepts a crop image upload, forwards it to an external ML inference
//! service through a resilient HTTP client, enriches the prediction with
//! a static disease-guidance catalog, and returns a combined report.

pub mod catalog;
pub mod config;
pub mod http;
pub mod inference;
pub mod lifecycle;
pub mod resilience;

pub use catalog::DiseaseCatalog;
pub use config::AppConfig;
pub use http::HttpServer;
pub use inference::InferenceClient;
pub use lifecycle::Shutdown;
