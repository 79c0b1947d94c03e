//! Client for the external crop-disease inference service.
//!
//! # Data Flow
//! ```text
//! Handler call:
//!     → client.rs (build request, pick timeout tier, retry loop)
//!     → per attempt: transport outcome / HTTP status / body decode
//!     → outcome.rs (classify failure: retryable vs terminal)
//!     → resilience::backoff (delay before the next attempt)
//!     → normalized Result<Prediction, PredictionError> back to the handler
//! ```
//!
//! # Design Decisions
//! - Exactly one Success or Failure per logical call; errors are values,
//!   nothing panics past this boundary
//! - Retry state is local to a call; concurrent calls share only the
//!   connection pool
//! - 4xx and malformed 2xx bodies are terminal; transport errors and 5xx
//!   are retried with exponential backoff

pub mod client;
pub mod outcome;
pub mod types;

pub use client::InferenceClient;
pub use types::{ErrorKind, Prediction, PredictionError};
