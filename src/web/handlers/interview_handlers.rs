// src/web/handlers/interview_handlers.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::database::{ApplicationRepository, DatabaseConfig, InterviewRepository};
use crate::types::application::{interview_type_label, Interview, InterviewPatch, NewInterview};
use crate::web::types::{ApiError, DeleteResponse};

pub async fn list_interviews_handler(
    upcoming: bool,
    application_id: Option<i64>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<Interview>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let interviews = InterviewRepository::new(pool)
        .list(upcoming, application_id)
        .await
        .map_err(ApiError::database)?;

    Ok(Json(interviews))
}

/// Creating an interview also moves the owning application to `interviewing`
/// (handled inside the repository, so the side effect cannot be skipped).
pub async fn create_interview_handler(
    body: Json<NewInterview>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<Interview>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;
    let body = body.into_inner();

    if ApplicationRepository::new(pool)
        .find(body.application_id)
        .await
        .map_err(ApiError::database)?
        .is_none()
    {
        return Err(ApiError::not_found("Application not found".to_string()));
    }

    let interview = InterviewRepository::new(pool)
        .create(&body)
        .await
        .map_err(ApiError::database)?;

    info!(
        "Recorded {} (interview {}) for application {}",
        interview_type_label(interview.interview_type.as_deref()),
        interview.id,
        interview.application_id
    );

    Ok(status::Custom(Status::Created, Json(interview)))
}

pub async fn update_interview_handler(
    id: i64,
    patch: Json<InterviewPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Interview>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    InterviewRepository::new(pool)
        .update(id, &patch)
        .await
        .map_err(ApiError::database)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Interview not found".to_string()))
}

pub async fn delete_interview_handler(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let deleted = InterviewRepository::new(pool)
        .delete(id)
        .await
        .map_err(ApiError::database)?;

    if !deleted {
        return Err(ApiError::not_found("Interview not found".to_string()));
    }

    Ok(Json(DeleteResponse { deleted: true }))
}
