//! Request handlers.
//!
//! Handlers own the HTTP framing the inference client deliberately does
//! not: a normalized prediction failure becomes a status code and a JSON
//! envelope here. A failed prediction never crashes the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::catalog::DiseaseCatalog;
use crate::inference::{ErrorKind, InferenceClient, PredictionError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceClient>,
    pub catalog: Arc<DiseaseCatalog>,
    /// True until the first prediction is dispatched. The first request
    /// after startup likely hits a cold remote, so it gets the long
    /// timeout tier. Consumed with `swap`, so exactly one request pays
    /// the cold-start budget.
    pub cold_start: Arc<AtomicBool>,
}

/// Combined prediction + catalog report.
#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub crop: String,
    pub disease: String,
    pub confidence: f64,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub organic_methods: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    message: String,
    error: String,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    model_loaded: bool,
}

#[derive(Debug, Serialize)]
struct CropsReport {
    success: bool,
    count: usize,
    crops: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `POST /api/crop/analyze` — multipart upload with `image` and `crop`
/// fields. Returns the prediction merged with catalog guidance.
pub async fn analyze(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut crop: Option<String> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("image") => match field.bytes().await {
                        Ok(bytes) => image_bytes = Some(bytes.to_vec()),
                        Err(e) => {
                            return bad_request(format!("failed to read image field: {e}"))
                        }
                    },
                    Some("crop") => match field.text().await {
                        Ok(text) => crop = Some(text),
                        Err(e) => return bad_request(format!("failed to read crop field: {e}")),
                    },
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(format!("invalid multipart body: {e}")),
        }
    }

    let Some(image_bytes) = image_bytes else {
        return bad_request("Image is required".to_string());
    };
    let Some(crop) = crop else {
        return bad_request("Crop name is required".to_string());
    };

    let cold_start = state.cold_start.swap(false, Ordering::SeqCst);
    tracing::debug!(crop = %crop, bytes = image_bytes.len(), cold_start, "Analyzing crop image");

    match state.inference.predict(&image_bytes, &crop, cold_start).await {
        Ok(prediction) => {
            let guidance = state.catalog.lookup(&crop, &prediction.disease);
            tracing::info!(
                crop = %crop,
                disease = %prediction.disease,
                confidence = prediction.confidence,
                "Analysis complete"
            );
            Json(AnalyzeReport {
                crop,
                disease: prediction.disease,
                confidence: prediction.confidence,
                treatment: guidance.treatment,
                prevention: guidance.prevention,
                organic_methods: guidance.organic_methods,
            })
            .into_response()
        }
        Err(err) => prediction_failure(err),
    }
}

/// `GET /api/crop/health` — liveness of the remote model, best-effort.
pub async fn health(State(state): State<AppState>) -> Response {
    let model_loaded = state.inference.check_health().await;
    Json(HealthReport {
        status: if model_loaded { "ready" } else { "not_ready" },
        model_loaded,
    })
    .into_response()
}

/// `GET /api/crop/crops` — crop list from the remote, empty on failure.
pub async fn crops(State(state): State<AppState>) -> Response {
    match state.inference.available_crops().await {
        Ok(crops) => Json(CropsReport {
            success: true,
            count: crops.len(),
            crops,
            error: None,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(kind = %err.kind, error = %err.message, "Crop list fetch failed");
            Json(CropsReport {
                success: false,
                count: 0,
                crops: Vec::new(),
                error: Some(err.message),
            })
            .into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

/// Map a normalized prediction failure to HTTP framing.
fn prediction_failure(err: PredictionError) -> Response {
    let status = match err.kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorEnvelope {
            message: "Disease detection failed".to_string(),
            error: err.message,
            kind: err.kind,
            status_code: err.status,
        }),
    )
        .into_response()
}
