// src/web/handlers/job_handlers.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashMap;
use tracing::info;

use crate::database::{
    is_unique_violation, ApplicationRepository, DatabaseConfig, JobListFilter, JobRepository,
};
use crate::import::RawJob;
use crate::stats::calculate_stats;
use crate::types::application::{Application, ApplicationStatus};
use crate::types::job::{AtsPlatform, JobPatch};
use crate::web::types::{ApiError, BrowseRequest, BrowseResponse, DeleteResponse, JobWithApplication};

const DEFAULT_PAGE_SIZE: i64 = 100;

pub async fn list_jobs_handler(
    search: Option<String>,
    status: Option<String>,
    min_score: Option<i64>,
    platform: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<JobWithApplication>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let platform = match platform.as_deref() {
        Some(tag) => Some(
            tag.parse::<AtsPlatform>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };
    let status = match status.as_deref() {
        Some(tag) => Some(
            tag.parse::<ApplicationStatus>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        ),
        None => None,
    };

    let filter = JobListFilter {
        search,
        min_score,
        platform,
        status,
        limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: offset.unwrap_or(0),
    };

    let jobs = JobRepository::new(pool)
        .list(&filter)
        .await
        .map_err(ApiError::database)?;

    let applications = ApplicationRepository::new(pool)
        .list(None)
        .await
        .map_err(ApiError::database)?;
    let mut by_job: HashMap<i64, Application> = applications
        .into_iter()
        .map(|application| (application.job_id, application))
        .collect();

    let listed = jobs
        .into_iter()
        .map(|job| {
            let application = by_job.remove(&job.id);
            JobWithApplication { job, application }
        })
        .collect();

    Ok(Json(listed))
}

pub async fn create_job_handler(
    raw: Json<RawJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<JobWithApplication>>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let new_job = raw
        .into_inner()
        .normalize()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job = JobRepository::new(pool).create(&new_job).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::conflict(format!("Job already tracked: {}", new_job.job_url))
        } else {
            ApiError::database(e)
        }
    })?;

    // Every tracked job gets its application record up front.
    let application = ApplicationRepository::new(pool)
        .create_for_job(job.id, ApplicationStatus::New)
        .await
        .map_err(ApiError::database)?;

    info!("Tracked new job {} ({} at {})", job.id, job.role, job.company);

    Ok(status::Custom(
        Status::Created,
        Json(JobWithApplication {
            job,
            application: Some(application),
        }),
    ))
}

pub async fn get_job_handler(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobWithApplication>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let Some(job) = JobRepository::new(pool)
        .find(id)
        .await
        .map_err(ApiError::database)?
    else {
        return Err(ApiError::not_found("Job not found".to_string()));
    };

    let repo = ApplicationRepository::new(pool);
    let application = match repo.find_by_job(id).await.map_err(ApiError::database)? {
        Some(application) => repo
            .find_with_interviews(application.id)
            .await
            .map_err(ApiError::database)?,
        None => None,
    };

    Ok(Json(JobWithApplication { job, application }))
}

pub async fn update_job_handler(
    id: i64,
    patch: Json<JobPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobWithApplication>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let Some(job) = JobRepository::new(pool)
        .update(id, &patch)
        .await
        .map_err(ApiError::database)?
    else {
        return Err(ApiError::not_found("Job not found".to_string()));
    };

    let application = ApplicationRepository::new(pool)
        .find_by_job(id)
        .await
        .map_err(ApiError::database)?;

    Ok(Json(JobWithApplication { job, application }))
}

pub async fn delete_job_handler(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let deleted = JobRepository::new(pool)
        .delete(id)
        .await
        .map_err(ApiError::database)?;

    if !deleted {
        return Err(ApiError::not_found("Job not found".to_string()));
    }

    Ok(Json(DeleteResponse { deleted: true }))
}

/// The core pipeline as an endpoint: load the collection, narrow it with the
/// request's filter state (hidden -> text -> score -> tech -> sort), compute
/// stats over both the full and the narrowed collection, return one page.
pub async fn browse_jobs_handler(
    request: Json<BrowseRequest>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<BrowseResponse>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let all_jobs = JobRepository::new(pool)
        .all()
        .await
        .map_err(ApiError::database)?;

    let request = request.into_inner();
    let filtered = request.query.run(&all_jobs);

    let stats = calculate_stats(&all_jobs);
    let filtered_stats = calculate_stats(&filtered);
    let filtered_count = filtered.len();

    let offset = request.offset.unwrap_or(0);
    let limit = request.limit.unwrap_or(DEFAULT_PAGE_SIZE as usize);
    let page = filtered.into_iter().skip(offset).take(limit).collect();

    Ok(Json(BrowseResponse {
        jobs: page,
        total: all_jobs.len(),
        filtered_count,
        stats,
        filtered_stats,
    }))
}
