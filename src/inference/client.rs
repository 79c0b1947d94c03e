//! Resilient HTTP client for the remote prediction service.

use std::time::Duration;

use reqwest::multipart;
use serde::de::DeserializeOwned;

use crate::config::InferenceConfig;
use crate::inference::types::{
    ClientBuildError, CropsBody, ErrorBody, ErrorKind, HealthBody, PredictBody, Prediction,
    PredictionError,
};
use crate::resilience::backoff::calculate_backoff;

/// Client wrapping the inference service with retry, backoff and
/// timeout tiering.
///
/// Cheap to clone; the underlying connection pool is shared. All retry
/// state lives on the stack of a single call, so concurrent calls never
/// interfere with each other.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
    base_backoff_ms: u64,
    max_backoff_ms: u64,
    normal_timeout: Duration,
    cold_start_timeout: Duration,
}

impl InferenceClient {
    /// Build a client from validated configuration.
    pub fn new(config: &InferenceConfig) -> Result<Self, ClientBuildError> {
        // Parse eagerly so a bad URL fails at startup, not per request.
        let parsed: url::Url =
            config
                .base_url
                .parse()
                .map_err(|source| ClientBuildError::InvalidBaseUrl {
                    url: config.base_url.clone(),
                    source,
                })?;

        // No client-wide timeout: the tier is chosen per attempt.
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            base_backoff_ms: config.base_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
            normal_timeout: Duration::from_millis(config.normal_timeout_ms),
            cold_start_timeout: Duration::from_millis(config.cold_start_timeout_ms),
        })
    }

    /// Request a disease prediction for an uploaded image.
    ///
    /// `cold_start` selects the long timeout tier, absorbing the latency
    /// of a remote that must first load model weights. Only the caller
    /// knows from context whether that is likely.
    pub async fn predict(
        &self,
        image_bytes: &[u8],
        crop_label: &str,
        cold_start: bool,
    ) -> Result<Prediction, PredictionError> {
        if image_bytes.is_empty() {
            return Err(PredictionError::invalid_input("image payload is empty"));
        }
        if crop_label.trim().is_empty() {
            return Err(PredictionError::invalid_input("crop label is empty"));
        }

        let timeout = if cold_start {
            self.cold_start_timeout
        } else {
            self.normal_timeout
        };
        let url = format!("{}/predict", self.base_url);

        let mut attempt: u32 = 1;
        loop {
            tracing::debug!(
                url = %url,
                attempt,
                max_attempts = self.max_retries,
                timeout_ms = timeout.as_millis() as u64,
                crop = %crop_label,
                "Sending prediction request"
            );

            match self
                .send_predict(&url, image_bytes, crop_label, timeout)
                .await
            {
                Ok(prediction) => {
                    tracing::debug!(
                        disease = %prediction.disease,
                        confidence = prediction.confidence,
                        attempt,
                        "Prediction succeeded"
                    );
                    return Ok(prediction);
                }
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.max_retries {
                        tracing::warn!(
                            kind = %err.kind,
                            status = ?err.status,
                            attempt,
                            error = %err.message,
                            "Prediction failed"
                        );
                        return Err(err);
                    }
                    let delay =
                        calculate_backoff(attempt, self.base_backoff_ms, self.max_backoff_ms);
                    tracing::warn!(
                        kind = %err.kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err.message,
                        "Attempt failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Best-effort liveness probe against `/health`.
    ///
    /// True only when the transport succeeds and the body explicitly
    /// reports the model as loaded. Never errors.
    pub async fn check_health(&self) -> bool {
        match self.get_with_retry::<HealthBody>("health").await {
            Ok(body) => {
                let loaded = body.model_loaded == Some(true);
                tracing::debug!(model_loaded = loaded, "Model health check completed");
                loaded
            }
            Err(err) => {
                tracing::warn!(kind = %err.kind, error = %err.message, "Model health check failed");
                false
            }
        }
    }

    /// Fetch the list of crop names the model recognizes.
    pub async fn available_crops(&self) -> Result<Vec<String>, PredictionError> {
        let body = self.get_with_retry::<CropsBody>("crops").await?;
        body.crops.ok_or_else(|| {
            PredictionError::new(
                ErrorKind::MalformedResponse,
                "crops response missing 'crops' field",
                Some(200),
            )
        })
    }

    /// One prediction attempt: multipart POST, then response decode.
    async fn send_predict(
        &self,
        url: &str,
        image_bytes: &[u8],
        crop_label: &str,
        timeout: Duration,
    ) -> Result<Prediction, PredictionError> {
        let part = multipart::Part::bytes(image_bytes.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(PredictionError::from_transport)?;
        let form = multipart::Form::new()
            .part("image", part)
            .text("crop", crop_label.to_string());

        let response = self
            .http
            .post(url)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(PredictionError::from_transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(PredictionError::from_transport)?;

        if !status.is_success() {
            return Err(Self::status_failure(status, &bytes));
        }

        let body: PredictBody = serde_json::from_slice(&bytes).map_err(|e| {
            PredictionError::new(
                ErrorKind::MalformedResponse,
                format!("unparseable prediction body: {e}"),
                Some(status.as_u16()),
            )
        })?;

        // The service reports in-band failure with success=false.
        if body.success == Some(false) {
            return Err(PredictionError::new(
                ErrorKind::MalformedResponse,
                body.error
                    .unwrap_or_else(|| "prediction reported failure without detail".to_string()),
                Some(status.as_u16()),
            ));
        }

        match (body.disease, body.confidence) {
            (Some(disease), Some(confidence)) => Ok(Prediction {
                disease,
                confidence,
            }),
            _ => Err(PredictionError::new(
                ErrorKind::MalformedResponse,
                "prediction body missing 'disease' or 'confidence'",
                Some(status.as_u16()),
            )),
        }
    }

    /// GET a JSON endpoint with the normal timeout and the same retry
    /// policy as `predict` (no cold-start tier).
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, PredictionError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut attempt: u32 = 1;
        loop {
            match self.get_once::<T>(&url).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.max_retries {
                        return Err(err);
                    }
                    let delay =
                        calculate_backoff(attempt, self.base_backoff_ms, self.max_backoff_ms);
                    tracing::warn!(
                        url = %url,
                        kind = %err.kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "GET failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, PredictionError> {
        let response = self
            .http
            .get(url)
            .timeout(self.normal_timeout)
            .send()
            .await
            .map_err(PredictionError::from_transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(PredictionError::from_transport)?;

        if !status.is_success() {
            return Err(Self::status_failure(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            PredictionError::new(
                ErrorKind::MalformedResponse,
                format!("unparseable response body: {e}"),
                Some(status.as_u16()),
            )
        })
    }

    /// Normalize a non-2xx response, pulling the service's error message
    /// out of the body when it has one.
    fn status_failure(status: reqwest::StatusCode, body: &[u8]) -> PredictionError {
        let kind = if status.is_client_error() {
            ErrorKind::ClientError
        } else {
            ErrorKind::ServerError
        };
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| format!("inference service returned {status}"));
        PredictionError::new(kind, message, Some(status.as_u16()))
    }
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("normal_timeout", &self.normal_timeout)
            .field("cold_start_timeout", &self.cold_start_timeout)
            .finish()
    }
}
