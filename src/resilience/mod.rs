//! Resilience primitives for outbound calls.
//!
//! # Data Flow
//! ```text
//! Attempt against the inference service:
//!     → per-attempt timeout (enforced by the HTTP client)
//!     → on failure: inference::outcome classifies retryable vs terminal
//!     → backoff.rs computes the delay before the next attempt
//! ```
//!
//! # Design Decisions
//! - Every outbound attempt has a deadline; no unbounded waits
//! - Backoff is deterministic exponential, capped
//! - Classification lives next to the client; only the delay math is here

pub mod backoff;
