//! Result and error types for the inference client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A successful prediction from the remote model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Disease class name, e.g. `"Apple___Apple_scab"`.
    pub disease: String,
    /// Confidence percentage as reported by the service.
    pub confidence: f64,
}

/// Failure classification for a prediction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied empty input; no network call was made.
    InvalidInput,
    /// Transport-level failure (connection refused, reset, DNS).
    NetworkError,
    /// The per-attempt deadline elapsed.
    Timeout,
    /// Remote returned 5xx.
    ServerError,
    /// Remote returned 4xx; retrying cannot fix this.
    ClientError,
    /// Remote returned 2xx but the body was not a usable prediction.
    MalformedResponse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ServerError => "server_error",
            ErrorKind::ClientError => "client_error",
            ErrorKind::MalformedResponse => "malformed_response",
        };
        f.write_str(s)
    }
}

/// Normalized failure returned to callers.
///
/// Carries the classification of the last attempt, its message, and the
/// HTTP status when one was observed.
#[derive(Debug, Clone, Error, Serialize)]
#[error("inference failed ({kind}): {message}")]
pub struct PredictionError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl PredictionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message, None)
    }

    /// Map a transport-level error from the HTTP client.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::NetworkError
        };
        Self::new(kind, err.to_string(), None)
    }
}

/// Error constructing the client itself (not a per-call failure).
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid inference base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to construct HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Wire shape of a `/predict` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct PredictBody {
    pub success: Option<bool>,
    pub disease: Option<String>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
}

/// Wire shape of a `/health` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct HealthBody {
    pub model_loaded: Option<bool>,
}

/// Wire shape of a `/crops` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct CropsBody {
    pub crops: Option<Vec<String>>,
}

/// Error envelope the service attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}
