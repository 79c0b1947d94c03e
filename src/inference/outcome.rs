//! Attempt outcome classification.
//!
//! The retry loop never inspects error internals directly; it asks this
//! module whether the failure is worth another attempt. Transport failures
//! and 5xx responses are retryable. 4xx responses and malformed 2xx bodies
//! are terminal: the remote answered, and answering again won't differ.

use crate::inference::types::{ErrorKind, PredictionError};

/// Whether a failed attempt should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retryable,
    Terminal,
}

/// Classify a failure kind.
pub fn classify(kind: ErrorKind) -> Disposition {
    match kind {
        ErrorKind::NetworkError | ErrorKind::Timeout | ErrorKind::ServerError => {
            Disposition::Retryable
        }
        ErrorKind::InvalidInput | ErrorKind::ClientError | ErrorKind::MalformedResponse => {
            Disposition::Terminal
        }
    }
}

impl PredictionError {
    /// True if another attempt could change the outcome.
    pub fn is_retryable(&self) -> bool {
        classify(self.kind) == Disposition::Retryable
    }
}
