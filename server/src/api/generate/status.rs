use crate::api::ErrorResponse;
use crate::workflow::{self, GenerationError};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerationStatusResponse {
    /// The generation job ID
    pub id: Uuid,
    /// Current job status (pending, fetching, generating, completed, failed)
    pub status: String,
    /// Requested output format
    pub format: String,
    /// Result object once the job has finished:
    /// {"success": bool, "documents"?: ..., "message"?: ..., "error"?: ...}
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub result: Option<serde_json::Value>,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/generate_recipes/status/{job_id}",
    tag = "generate",
    params(
        ("job_id" = Uuid, Path, description = "Generation job ID")
    ),
    responses(
        (status = 200, description = "Generation job status", body = GenerationStatusResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn get_generation_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    let job = match workflow::get_job(&state.pool, job_id) {
        Ok(j) => j,
        Err(GenerationError::JobNotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Generation job not found".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to get generation job: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get generation job".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(GenerationStatusResponse {
            id: job.id,
            status: job.status,
            format: job.format,
            result: job.result,
            error: job.error_message,
        }),
    )
        .into_response()
}
