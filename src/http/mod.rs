//! HTTP surface of the service.
//!
//! # Responsibilities
//! - Build the Axum router and middleware stack
//! - Frame inference results as HTTP responses (status codes, JSON
//!   envelopes)
//! - Serve until the shutdown signal fires

pub mod handlers;
pub mod server;

pub use server::HttpServer;
