// src/web/types.rs
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use std::path::PathBuf;

use crate::import::RawJob;
use crate::query::JobQuery;
use crate::stats::JobStats;
use crate::types::application::Application;
use crate::types::job::Job;

pub struct ServerConfig {
    pub merged_jobs_path: PathBuf,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

/// Failure response carrying a proper HTTP status and a structured JSON body,
/// so clients can branch on the status and surface the suggestions.
pub struct ApiError {
    pub status: Status,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: Status, error: String, error_code: &str, suggestions: Vec<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                error,
                error_code: error_code.to_string(),
                suggestions,
            },
        }
    }

    pub fn not_found(error: String) -> Self {
        Self::new(
            Status::NotFound,
            error,
            "NOT_FOUND",
            vec!["Check the identifier and try again".to_string()],
        )
    }

    pub fn bad_request(error: String) -> Self {
        Self::new(
            Status::BadRequest,
            error,
            "BAD_REQUEST",
            vec![
                "Check your request JSON format".to_string(),
                "Verify all required fields are present".to_string(),
            ],
        )
    }

    pub fn conflict(error: String) -> Self {
        Self::new(
            Status::Conflict,
            error,
            "DUPLICATE",
            vec!["A record with the same unique field already exists".to_string()],
        )
    }

    pub fn database(err: anyhow::Error) -> Self {
        tracing::error!("Database operation failed: {}", err);
        Self::new(
            Status::InternalServerError,
            "Database operation failed".to_string(),
            "DATABASE_ERROR",
            vec!["Try again in a few moments".to_string()],
        )
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.body)).respond_to(request)
    }
}

/// Job as listed, with its tracking record attached when one exists.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobWithApplication {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
}

/// Filter state for POST /jobs/browse: the in-memory pipeline plus a page
/// window.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct BrowseRequest {
    #[serde(flatten)]
    pub query: JobQuery,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One page of the narrowed collection, plus derived stats over both the full
/// and the narrowed collection (the analytics header needs both).
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BrowseResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub filtered_count: usize,
    pub stats: JobStats,
    pub filtered_stats: JobStats,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ImportRequest {
    /// "merged" reads the configured scraper output file; "file" imports the
    /// inline `jobs` list.
    pub source: Option<String>,
    pub jobs: Option<Vec<RawJob>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DeleteResponse {
    pub deleted: bool,
}
