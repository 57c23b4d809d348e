use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::generation_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct GenerationJob {
    pub id: Uuid,
    pub user_id: String,
    pub recipe_names: serde_json::Value,
    pub format: String,
    pub download: bool,
    pub status: String,
    pub current_step: Option<String>,
    pub error_message: Option<String>,
    pub result: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::generation_jobs)]
pub struct NewGenerationJob<'a> {
    pub user_id: &'a str,
    pub recipe_names: serde_json::Value,
    pub format: &'a str,
    pub download: bool,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::generation_step_outputs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct StepOutput {
    pub id: Uuid,
    pub job_id: Uuid,
    pub step_name: String,
    pub output: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::generation_step_outputs)]
pub struct NewStepOutput {
    pub job_id: Uuid,
    pub step_name: String,
    pub output: serde_json::Value,
}
