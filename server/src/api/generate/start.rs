use crate::api::ErrorResponse;
use crate::workflow;
use crate::AppState;
use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use galley_core::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

/// How long to wait for the job to finish before handing back a polling URL.
const DEFAULT_SYNC_WAIT_MS: u64 = 2000;

fn sync_wait() -> Duration {
    let ms = std::env::var("GALLEY_SYNC_WAIT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SYNC_WAIT_MS);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRecipesRequest {
    /// Names of the stored recipes to include in the document
    pub recipe_names: Vec<String>,
    /// Output format: "pdf" or "docx"
    #[serde(default = "default_format")]
    pub format: String,
    /// If true and the run finishes synchronously, stream the binary back
    #[serde(default)]
    pub download: bool,
}

fn default_format() -> String {
    "pdf".to_string()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingJobResponse {
    /// The generation job ID
    pub id: Uuid,
    /// Current job status
    pub status: String,
    /// URL to poll for the finished result
    pub status_url: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Stream the decoded document back as an attachment.
fn attachment_response(user_id: &str, format: DocumentFormat, bytes: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"recipes_{}.{}\"",
                user_id,
                format.extension()
            ),
        )
        .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, "Content-Disposition")
        .body(Body::from(bytes))
        .unwrap()
        .into_response()
}

#[utoipa::path(
    post,
    path = "/generate_recipes/{user_id}",
    tag = "generate",
    params(
        ("user_id" = String, Path, description = "User whose recipes to render")
    ),
    request_body = GenerateRecipesRequest,
    responses(
        (status = 200, description = "Finished result: binary attachment (download=true) or JSON result object"),
        (status = 202, description = "Job still running, poll the status URL", body = PendingJobResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn start_generation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<GenerateRecipesRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Ok(Json(request)) = body else {
        return bad_request("Invalid request body");
    };

    if request.recipe_names.is_empty() {
        return bad_request("Please provide recipe_names in the request body");
    }

    let format: DocumentFormat = match request.format.to_lowercase().parse() {
        Ok(f) => f,
        Err(e) => return bad_request(&e.to_string()),
    };

    let job = match workflow::create_job(
        &state.pool,
        &user_id,
        &request.recipe_names,
        format,
        request.download,
    ) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("Failed to create generation job: {}", e);
            return internal_error("Failed to create generation job");
        }
    };
    let job_id = job.id;

    // Spawn the workflow and give it a bounded window to finish inline.
    // On timeout the task keeps running and the client gets a polling URL.
    let pool = state.pool.clone();
    let provider = state.provider.clone();
    let mut handle = tokio::spawn(async move {
        workflow::run_generation_job(pool, provider, job_id).await;
    });
    let _ = tokio::time::timeout(sync_wait(), &mut handle).await;

    let job = match workflow::get_job(&state.pool, job_id) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("Failed to read back generation job {}: {}", job_id, e);
            return internal_error("Failed to read generation job");
        }
    };

    if job.status == workflow::STATUS_COMPLETED || job.status == workflow::STATUS_FAILED {
        let result = job
            .result
            .unwrap_or_else(|| workflow::failure_result("Missing job result"));

        if request.download && job.status == workflow::STATUS_COMPLETED {
            let encoded = result
                .get("documents")
                .and_then(|d| d.get(format.extension()))
                .and_then(|v| v.as_str());
            if let Some(encoded) = encoded {
                return match BASE64.decode(encoded) {
                    Ok(bytes) => attachment_response(&user_id, format, bytes),
                    Err(e) => {
                        tracing::error!("Job {} produced undecodable document: {}", job_id, e);
                        internal_error("Failed to decode generated document")
                    }
                };
            }
        }

        return (StatusCode::OK, Json(result)).into_response();
    }

    // Still running; this includes download=true, which deliberately falls
    // through to the same polling handle.
    (
        StatusCode::ACCEPTED,
        Json(PendingJobResponse {
            id: job_id,
            status: job.status,
            status_url: format!("/generate_recipes/status/{}", job_id),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: GenerateRecipesRequest =
            serde_json::from_str(r#"{"recipe_names": ["Tomato Soup"]}"#).unwrap();
        assert_eq!(request.format, "pdf");
        assert!(!request.download);
    }

    #[test]
    fn test_request_rejects_missing_recipe_names() {
        let result =
            serde_json::from_str::<GenerateRecipesRequest>(r#"{"format": "pdf"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_is_case_insensitive_after_lowering() {
        let format: DocumentFormat = "PDF".to_lowercase().parse().unwrap();
        assert_eq!(format, DocumentFormat::Pdf);
    }
}
