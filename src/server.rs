//! HTTP surface for the background removal pipeline
//!
//! One upload endpoint plus a health check. All pipeline failures surface
//! here as a JSON error object and a status code; detail goes to the logs,
//! never the response body.

use crate::config::ServerConfig;
use crate::detector::{NullDetector, SharedDetector};
use crate::error::{CutoutError, Result};
use crate::processor::BackgroundRemover;
use crate::services::{OutputWriter, TempUpload};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Upload size cap; pose inputs are photos, not archives
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const GENERIC_FAILURE: &str = "An error occurred while removing the background";

/// Application state shared across handlers
pub struct AppState {
    /// The pipeline, holding the process-wide detector handle
    pub remover: BackgroundRemover,
    /// Output PNG destination
    pub writer: OutputWriter,
}

#[derive(Serialize)]
struct SuccessBody {
    message: String,
    #[serde(rename = "outputPath")]
    output_path: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct HealthBody {
    status: String,
    version: String,
}

/// Map a pipeline error onto the HTTP contract.
///
/// `MissingInput` is the caller's fault (400) and carries its own message;
/// everything else is a 500 with a generic body, logged with detail
/// server-side.
fn error_response(err: &CutoutError) -> Response {
    match err {
        CutoutError::MissingInput => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )
            .into_response(),
        _ => {
            error!(error = %err, "background removal request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: GENERIC_FAILURE.to_string(),
                }),
            )
                .into_response()
        },
    }
}

async fn health_handler() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Pull the `image` field out of the multipart body and spill it to a scoped
/// temp file. Anything short of a usable upload is `MissingInput`.
async fn extract_upload(mut multipart: Multipart) -> Result<TempUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| CutoutError::MissingInput)?
    {
        if field.name() == Some("image") {
            let bytes = field.bytes().await.map_err(|_| CutoutError::MissingInput)?;
            if bytes.is_empty() {
                return Err(CutoutError::MissingInput);
            }
            return TempUpload::write(&bytes);
        }
    }
    Err(CutoutError::MissingInput)
}

async fn remove_background_handler(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(multipart) = multipart else {
        return error_response(&CutoutError::MissingInput);
    };

    // The guard deletes the upload when this function returns, on every path
    let upload = match extract_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => return error_response(&err),
    };

    let outcome = upload
        .read()
        .and_then(|bytes| state.remover.process_bytes(&bytes))
        .and_then(|result| state.writer.write(&result));

    match outcome {
        Ok(path) => (
            StatusCode::OK,
            Json(SuccessBody {
                message: "Background removed successfully".to_string(),
                output_path: path.display().to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Build the router over shared state
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/design/remove-background", post(remove_background_handler))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Build the process-wide detector handle.
///
/// Without a model path the service runs on the null detector: requests
/// succeed and produce fully transparent outputs.
pub fn build_detector(
    model_path: Option<&std::path::Path>,
    score_threshold: f32,
) -> Result<SharedDetector> {
    #[cfg(feature = "onnx")]
    if let Some(path) = model_path {
        let detector = crate::backends::OnnxPoseDetector::new(path, score_threshold)?;
        return Ok(Arc::new(detector));
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = score_threshold;
        if model_path.is_some() {
            return Err(CutoutError::invalid_config(
                "model path configured but the onnx feature is disabled",
            ));
        }
    }

    warn!("no pose model configured; every output will be fully transparent");
    Ok(Arc::new(NullDetector))
}

/// Run the HTTP server until shutdown
///
/// # Errors
/// Returns configuration, bind, and serve errors.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let detector = build_detector(config.model_path.as_deref(), config.score_threshold)?;
    info!(detector = detector.name(), "detector initialized");

    let remover = BackgroundRemover::new(detector, config.pipeline)?;
    let writer = OutputWriter::new(&config.output_dir, &config.output_prefix);
    writer.ensure_dir()?;

    let state = Arc::new(AppState { remover, writer });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "server listening");
    info!("  GET  /health                          - Health check");
    info!("  POST /api/design/remove-background    - Background removal upload");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown signal handler");
    }
}
