//! API request handlers

use super::envelope::ArchiveBody;
use crate::config::OrchestratorConfig;
use crate::pipeline::{archive, failure_result, Orchestrator, PipelineError, RetrievalError};
use crate::types::{ErrorCode, OutputFormat, RunResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Runs share fixed file names in the workspace, so at most one is in flight
    pub orchestrator: Arc<Mutex<Orchestrator>>,
    /// Read-only config for archive retrieval, which does not wait on runs
    pub config: Arc<OrchestratorConfig>,
}

impl ApiState {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
            orchestrator: Arc::new(Mutex::new(Orchestrator::new(config))),
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Request body for `POST /api/v1/well-structure`
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Well description handed to the plotting tool
    pub well_data: serde_json::Value,
    /// `base64` (default) or `path`
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// POST /api/v1/well-structure - Generate, archive and return one schematic
///
/// A malformed body is answered with a `VALIDATION_ERROR` result like any
/// other rejected input.
pub async fn generate_well_structure(
    State(state): State<ApiState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let result = match request {
        Ok(Json(request)) => run_exclusive(&state, request).await,
        Err(rejection) => failure_result(&PipelineError::Validation(vec![rejection.body_text()])),
    };
    run_result_response(result)
}

/// Run one generation while holding the workspace lock.
///
/// The run and the lock guard live on their own task: a client that hangs up
/// neither stops the generator nor lets the next run in early.
async fn run_exclusive(state: &ApiState, request: GenerateRequest) -> RunResult {
    let orchestrator = Arc::clone(&state.orchestrator).lock_owned().await;
    let run = tokio::spawn(async move {
        orchestrator
            .generate(&request.well_data, request.output_format)
            .await
    });
    match run.await {
        Ok(result) => result,
        Err(e) => failure_result(&PipelineError::Unknown(format!("run task failed: {e}"))),
    }
}

fn run_result_response(result: RunResult) -> Response {
    let status = match result.error_code() {
        None => StatusCode::OK,
        Some(ErrorCode::ValidationError) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json::<RunResult>(result)).into_response()
}

// ============================================================================
// Archive Retrieval
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ArchiveList {
    pub archives: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub files: Vec<String>,
}

/// GET /api/v1/archives - Archive folder names, newest first
pub async fn list_archives(
    State(state): State<ApiState>,
) -> Result<ArchiveBody<ArchiveList>, RetrievalError> {
    let archives = archive::list_archives(&state.config)?;
    Ok(ArchiveBody::new(ArchiveList { archives }))
}

/// GET /api/v1/archives/:folder - Files stored for one run
pub async fn get_archive(
    State(state): State<ApiState>,
    Path(folder): Path<String>,
) -> Result<ArchiveBody<ArchiveEntry>, RetrievalError> {
    let files = archive::archive_contents(&state.config, &folder)?;
    Ok(ArchiveBody::new(ArchiveEntry { name: folder, files }))
}

/// GET /api/v1/archives/:folder/image - Primary image bytes
pub async fn get_archive_image(
    State(state): State<ApiState>,
    Path(folder): Path<String>,
) -> Result<Response, RetrievalError> {
    let bytes = archive::read_image(&state.config, &folder)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// GET /api/v1/archives/:folder/report - Markdown report text
pub async fn get_archive_report(
    State(state): State<ApiState>,
    Path(folder): Path<String>,
) -> Result<Response, RetrievalError> {
    let text = archive::read_report(&state.config, &folder)?;
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], text).into_response())
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
