//! Generation-job workflow.
//!
//! A job moves through `pending -> fetching -> generating -> completed`
//! (or `failed`), with each step's output checkpointed to the database so a
//! re-driven job resumes from the last completed step. There is no retry
//! policy and no partial success: any step failure fails the whole run.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use diesel::prelude::*;
use galley_core::llm::LlmProvider;
use galley_core::{
    filter_requested, generate_for_recipes, render_document, DocumentFormat, InstructionsError,
    Recipe, RenderError,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{GenerationJob, NewGenerationJob, NewStepOutput, StepOutput};
use crate::schema::{generation_jobs, generation_step_outputs};
use crate::store::{self, StoreError};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Instruction synthesis failed: {0}")]
    Instructions(#[from] InstructionsError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Job not found")]
    JobNotFound,

    #[error("Invalid job state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Job statuses
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_FETCHING: &str = "fetching";
pub const STATUS_GENERATING: &str = "generating";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// Step names for checkpointed outputs
const STEP_FETCH_RECIPES: &str = "fetch_recipes";
const STEP_RENDER_DOCUMENT: &str = "render_document";

/// Result payload when the lookup matches nothing. Not a failure status:
/// the run completes without invoking synthesis or rendering.
pub fn no_recipes_result() -> serde_json::Value {
    serde_json::json!({"success": false, "message": "No recipes found"})
}

pub fn failure_result(error: &str) -> serde_json::Value {
    serde_json::json!({"success": false, "error": error})
}

pub fn success_result(format: DocumentFormat, encoded: String) -> serde_json::Value {
    let mut documents = serde_json::Map::new();
    documents.insert(
        format.extension().to_string(),
        serde_json::Value::String(encoded),
    );
    serde_json::json!({"success": true, "documents": documents})
}

/// Create a new generation job.
pub fn create_job(
    pool: &DbPool,
    user_id: &str,
    recipe_names: &[String],
    format: DocumentFormat,
    download: bool,
) -> Result<GenerationJob, GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    let new_job = NewGenerationJob {
        user_id,
        recipe_names: serde_json::json!(recipe_names),
        format: format.extension(),
        download,
    };

    diesel::insert_into(generation_jobs::table)
        .values(&new_job)
        .get_result::<GenerationJob>(&mut conn)
        .map_err(|e| GenerationError::Database(e.to_string()))
}

/// Get a generation job by ID.
pub fn get_job(pool: &DbPool, job_id: Uuid) -> Result<GenerationJob, GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    generation_jobs::table
        .find(job_id)
        .first::<GenerationJob>(&mut conn)
        .optional()
        .map_err(|e| GenerationError::Database(e.to_string()))?
        .ok_or(GenerationError::JobNotFound)
}

/// Update job status and current_step.
fn update_status_and_step(
    pool: &DbPool,
    job_id: Uuid,
    status: &str,
    current_step: Option<&str>,
) -> Result<(), GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    diesel::update(generation_jobs::table.find(job_id))
        .set((
            generation_jobs::status.eq(status),
            generation_jobs::current_step.eq(current_step),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    Ok(())
}

/// Save a step output to the database (append-only).
fn save_step_output(
    pool: &DbPool,
    job_id: Uuid,
    step_name: &str,
    output: serde_json::Value,
) -> Result<(), GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    let new_output = NewStepOutput {
        job_id,
        step_name: step_name.to_string(),
        output,
    };

    diesel::insert_into(generation_step_outputs::table)
        .values(&new_output)
        .execute(&mut conn)
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    Ok(())
}

/// Get the most recent step output for a job by step name.
fn get_latest_step_output(
    pool: &DbPool,
    job_id: Uuid,
    step_name: &str,
) -> Result<Option<StepOutput>, GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    generation_step_outputs::table
        .filter(generation_step_outputs::job_id.eq(job_id))
        .filter(generation_step_outputs::step_name.eq(step_name))
        .order(generation_step_outputs::created_at.desc())
        .first::<StepOutput>(&mut conn)
        .optional()
        .map_err(|e| GenerationError::Database(e.to_string()))
}

/// Mark job as failed with a structured failure result.
fn mark_failed(pool: &DbPool, job_id: Uuid, error: &str) -> Result<(), GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    diesel::update(generation_jobs::table.find(job_id))
        .set((
            generation_jobs::status.eq(STATUS_FAILED),
            generation_jobs::error_message.eq(Some(error)),
            generation_jobs::result.eq(Some(failure_result(error))),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    Ok(())
}

/// Mark job as completed with its result payload.
fn mark_completed(
    pool: &DbPool,
    job_id: Uuid,
    result: serde_json::Value,
) -> Result<(), GenerationError> {
    let mut conn = pool
        .get()
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    diesel::update(generation_jobs::table.find(job_id))
        .set((
            generation_jobs::status.eq(STATUS_COMPLETED),
            generation_jobs::result.eq(Some(result)),
            generation_jobs::current_step.eq::<Option<String>>(None),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(|e| GenerationError::Database(e.to_string()))?;

    Ok(())
}

/// Synthesize instructions and render the document for a fetched recipe set.
///
/// The scratch directory is removed on every exit path when `scratch` drops,
/// including synthesis and render failures.
async fn generate_and_render(
    provider: &dyn LlmProvider,
    job: &GenerationJob,
    recipes: &[Recipe],
) -> Result<serde_json::Value, GenerationError> {
    let format: DocumentFormat = job
        .format
        .parse()
        .map_err(|_| GenerationError::InvalidState(format!("Unknown format: {}", job.format)))?;

    let instructions = generate_for_recipes(provider, recipes).await?;

    let scratch = tempfile::tempdir()?;
    let path = scratch
        .path()
        .join(format!("recipes_{}.{}", job.user_id, format.extension()));

    render_document(format, recipes, &instructions, &path)?;
    let bytes = std::fs::read(&path)?;

    Ok(success_result(format, BASE64.encode(bytes)))
}

/// Run the generation job state machine.
/// This processes the job through its states:
/// pending -> fetching -> generating -> completed
pub async fn run_generation_job(pool: Arc<DbPool>, provider: Arc<dyn LlmProvider>, job_id: Uuid) {
    if let Err(e) = run_generation_job_inner(&pool, provider.as_ref(), job_id).await {
        tracing::warn!("Generation job {} failed: {}", job_id, e);
    }
}

async fn run_generation_job_inner(
    pool: &DbPool,
    provider: &dyn LlmProvider,
    job_id: Uuid,
) -> Result<(), GenerationError> {
    let job = get_job(pool, job_id)?;

    match job.status.as_str() {
        STATUS_PENDING => {
            tracing::info!("Job {} transitioning from pending to fetching", job_id);
            update_status_and_step(pool, job_id, STATUS_FETCHING, Some(STEP_FETCH_RECIPES))?;
            Box::pin(run_generation_job_inner(pool, provider, job_id)).await
        }

        STATUS_FETCHING => {
            tracing::info!("Job {} fetching recipes for user {}", job_id, job.user_id);

            let requested: Vec<String> = serde_json::from_value(job.recipe_names.clone())
                .map_err(|e| GenerationError::InvalidState(e.to_string()))?;

            match store::fetch_user_recipes(pool, &job.user_id) {
                Ok(all) => {
                    let recipes = filter_requested(all, &requested);

                    if recipes.is_empty() {
                        tracing::info!("Job {} matched no recipes, completing", job_id);
                        mark_completed(pool, job_id, no_recipes_result())?;
                        return Ok(());
                    }

                    tracing::info!(
                        "Job {} fetched {} recipes, transitioning to generating",
                        job_id,
                        recipes.len()
                    );

                    let output = serde_json::json!({ "recipes": recipes });
                    save_step_output(pool, job_id, STEP_FETCH_RECIPES, output)?;
                    update_status_and_step(
                        pool,
                        job_id,
                        STATUS_GENERATING,
                        Some(STEP_RENDER_DOCUMENT),
                    )?;
                    Box::pin(run_generation_job_inner(pool, provider, job_id)).await
                }
                Err(e) => {
                    tracing::warn!("Job {} recipe lookup failed: {}", job_id, e);
                    mark_failed(pool, job_id, &e.to_string())?;
                    Ok(())
                }
            }
        }

        STATUS_GENERATING => {
            // Re-read the fetched recipes from the checkpoint rather than
            // carrying them in memory across the status transition.
            let fetch_output = get_latest_step_output(pool, job_id, STEP_FETCH_RECIPES)?
                .ok_or_else(|| GenerationError::InvalidState("No fetch output found".to_string()))?;

            let recipes: Vec<Recipe> = fetch_output
                .output
                .get("recipes")
                .ok_or_else(|| {
                    GenerationError::InvalidState("No recipes in fetch output".to_string())
                })
                .and_then(|v| {
                    serde_json::from_value(v.clone())
                        .map_err(|e| GenerationError::InvalidState(e.to_string()))
                })?;

            tracing::info!(
                "Job {} generating a {} document for {} recipes",
                job_id,
                job.format,
                recipes.len()
            );

            match generate_and_render(provider, &job, &recipes).await {
                Ok(result) => {
                    save_step_output(
                        pool,
                        job_id,
                        STEP_RENDER_DOCUMENT,
                        serde_json::json!({"format": job.format}),
                    )?;
                    tracing::info!("Job {} document generated, marking completed", job_id);
                    mark_completed(pool, job_id, result)?;
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Job {} document generation failed: {}", job_id, e);
                    mark_failed(pool, job_id, &e.to_string())?;
                    Ok(())
                }
            }
        }

        STATUS_COMPLETED | STATUS_FAILED => {
            // Terminal states - nothing to do
            Ok(())
        }

        other => Err(GenerationError::InvalidState(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_recipes_result_shape() {
        let result = no_recipes_result();
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "No recipes found");
        assert!(result.get("error").is_none());
    }

    #[test]
    fn test_failure_result_shape() {
        let result = failure_result("boom");
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "boom");
    }

    #[test]
    fn test_success_result_keys_document_by_extension() {
        let result = success_result(DocumentFormat::Docx, "AAAA".to_string());
        assert_eq!(result["success"], true);
        assert_eq!(result["documents"]["docx"], "AAAA");
        assert!(result["documents"].get("pdf").is_none());
    }
}
