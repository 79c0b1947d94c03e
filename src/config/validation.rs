//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Returns all
//! violations, not just the first, so a broken config can be fixed in one
//! pass.

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic violation.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("'{}' is not a socket address", config.listener.bind_address),
        });
    }

    match config.inference.base_url.parse::<url::Url>() {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "inference.base_url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "inference.base_url",
            message: format!("'{}' is not a URL: {}", config.inference.base_url, e),
        }),
    }

    if config.inference.max_retries == 0 {
        errors.push(ValidationError {
            field: "inference.max_retries",
            message: "must be at least 1".to_string(),
        });
    }

    if config.inference.normal_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "inference.normal_timeout_ms",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.inference.cold_start_timeout_ms < config.inference.normal_timeout_ms {
        errors.push(ValidationError {
            field: "inference.cold_start_timeout_ms",
            message: "must be at least normal_timeout_ms".to_string(),
        });
    }

    if config.inference.max_backoff_ms < config.inference.base_backoff_ms {
        errors.push(ValidationError {
            field: "inference.max_backoff_ms",
            message: "must be at least base_backoff_ms".to_string(),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "server.request_timeout_secs",
            message: "must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
