// src/web/handlers/application_handlers.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::database::{ApplicationRepository, DatabaseConfig, JobRepository};
use crate::types::application::{
    Application, ApplicationPatch, ApplicationStatus, ApplicationUpsert,
};
use crate::web::types::{ApiError, DeleteResponse};

pub async fn list_applications_handler(
    status_filter: Option<String>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let status_filter = match status_filter.as_deref() {
        Some(tag) => Some(
            tag.parse::<ApplicationStatus>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };

    let applications = ApplicationRepository::new(pool)
        .list(status_filter)
        .await
        .map_err(ApiError::database)?;

    Ok(Json(applications))
}

/// Upsert keyed on the owning job: updates the job's existing application
/// when there is one, creates it otherwise.
pub async fn upsert_application_handler(
    body: Json<ApplicationUpsert>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<Application>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;
    let body = body.into_inner();

    if JobRepository::new(pool)
        .find(body.job_id)
        .await
        .map_err(ApiError::database)?
        .is_none()
    {
        return Err(ApiError::not_found("Job not found".to_string()));
    }

    let repo = ApplicationRepository::new(pool);
    let existing = repo
        .find_by_job(body.job_id)
        .await
        .map_err(ApiError::database)?;

    let patch = ApplicationPatch {
        status: body.status,
        applied_date: body.applied_date,
        response_date: body.response_date,
        next_step: body.next_step,
        next_step_date: body.next_step_date,
        salary_discussed: body.salary_discussed,
        notes: body.notes,
        resume_version: body.resume_version,
        cover_letter_used: body.cover_letter_used,
        referral: body.referral,
    };

    match existing {
        Some(application) => {
            let updated = repo
                .update(application.id, &patch)
                .await
                .map_err(ApiError::database)?
                .ok_or_else(|| ApiError::not_found("Application not found".to_string()))?;

            info!("Updated application {} for job {}", updated.id, body.job_id);
            Ok(status::Custom(Status::Ok, Json(updated)))
        }
        None => {
            let created = repo
                .create_for_job(
                    body.job_id,
                    patch.status.unwrap_or(ApplicationStatus::New),
                )
                .await
                .map_err(ApiError::database)?;
            let created = repo
                .update(created.id, &patch)
                .await
                .map_err(ApiError::database)?
                .unwrap_or(created);

            Ok(status::Custom(Status::Created, Json(created)))
        }
    }
}

pub async fn get_application_handler(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Application>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    ApplicationRepository::new(pool)
        .find_with_interviews(id)
        .await
        .map_err(ApiError::database)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Application not found".to_string()))
}

pub async fn update_application_handler(
    id: i64,
    patch: Json<ApplicationPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Application>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    ApplicationRepository::new(pool)
        .update(id, &patch)
        .await
        .map_err(ApiError::database)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Application not found".to_string()))
}

pub async fn delete_application_handler(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let deleted = ApplicationRepository::new(pool)
        .delete(id)
        .await
        .map_err(ApiError::database)?;

    if !deleted {
        return Err(ApiError::not_found("Application not found".to_string()));
    }

    Ok(Json(DeleteResponse { deleted: true }))
}
