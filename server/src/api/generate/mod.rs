pub mod start;
pub mod status;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the document-generation endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_recipes/{user_id}", post(start::start_generation))
        .route(
            "/generate_recipes/status/{job_id}",
            get(status::get_generation_status),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(start::start_generation, status::get_generation_status),
    components(schemas(
        start::GenerateRecipesRequest,
        start::PendingJobResponse,
        status::GenerationStatusResponse,
    ))
)]
pub struct ApiDoc;
