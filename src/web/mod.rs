// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::database::DatabaseConfig;
use crate::environment::EnvironmentConfig;
use crate::import::RawJob;
use crate::types::application::{
    Application, ApplicationPatch, ApplicationUpsert, Interview, InterviewPatch, NewInterview,
};
use crate::types::job::JobPatch;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, patch, post, routes, Request, Response, State};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// ===== Job routes =====

#[get("/jobs?<search>&<status>&<min_score>&<platform>&<limit>&<offset>")]
pub async fn list_jobs(
    search: Option<String>,
    status: Option<String>,
    min_score: Option<i64>,
    platform: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<JobWithApplication>>, ApiError> {
    handlers::list_jobs_handler(search, status, min_score, platform, limit, offset, db_config).await
}

#[post("/jobs", data = "<raw>")]
pub async fn create_job(
    raw: Json<RawJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<JobWithApplication>>, ApiError> {
    handlers::create_job_handler(raw, db_config).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobWithApplication>, ApiError> {
    handlers::get_job_handler(id, db_config).await
}

#[patch("/jobs/<id>", data = "<patch>")]
pub async fn update_job(
    id: i64,
    patch: Json<JobPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<JobWithApplication>, ApiError> {
    handlers::update_job_handler(id, patch, db_config).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    handlers::delete_job_handler(id, db_config).await
}

#[post("/jobs/browse", data = "<request>")]
pub async fn browse_jobs(
    request: Json<BrowseRequest>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<BrowseResponse>, ApiError> {
    handlers::browse_jobs_handler(request, db_config).await
}

// ===== Application routes =====

#[get("/applications?<status>")]
pub async fn list_applications(
    status: Option<String>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<Application>>, ApiError> {
    handlers::list_applications_handler(status, db_config).await
}

#[post("/applications", data = "<body>")]
pub async fn upsert_application(
    body: Json<ApplicationUpsert>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<Application>>, ApiError> {
    handlers::upsert_application_handler(body, db_config).await
}

#[get("/applications/<id>")]
pub async fn get_application(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Application>, ApiError> {
    handlers::get_application_handler(id, db_config).await
}

#[patch("/applications/<id>", data = "<patch>")]
pub async fn update_application(
    id: i64,
    patch: Json<ApplicationPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Application>, ApiError> {
    handlers::update_application_handler(id, patch, db_config).await
}

#[delete("/applications/<id>")]
pub async fn delete_application(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    handlers::delete_application_handler(id, db_config).await
}

// ===== Interview routes =====

#[get("/interviews?<upcoming>&<application_id>")]
pub async fn list_interviews(
    upcoming: Option<bool>,
    application_id: Option<i64>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Vec<Interview>>, ApiError> {
    handlers::list_interviews_handler(upcoming.unwrap_or(false), application_id, db_config).await
}

#[post("/interviews", data = "<body>")]
pub async fn create_interview(
    body: Json<NewInterview>,
    db_config: &State<DatabaseConfig>,
) -> Result<status::Custom<Json<Interview>>, ApiError> {
    handlers::create_interview_handler(body, db_config).await
}

#[patch("/interviews/<id>", data = "<patch>")]
pub async fn update_interview(
    id: i64,
    patch: Json<InterviewPatch>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<Interview>, ApiError> {
    handlers::update_interview_handler(id, patch, db_config).await
}

#[delete("/interviews/<id>")]
pub async fn delete_interview(
    id: i64,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DeleteResponse>, ApiError> {
    handlers::delete_interview_handler(id, db_config).await
}

// ===== Import / stats / system routes =====

#[post("/import", data = "<request>")]
pub async fn import_jobs(
    request: Json<ImportRequest>,
    config: &State<ServerConfig>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<crate::import::ImportSummary>, ApiError> {
    handlers::import_handler(request, config, db_config).await
}

#[get("/stats")]
pub async fn get_stats(
    db_config: &State<DatabaseConfig>,
) -> Result<Json<crate::database::TrackerStats>, ApiError> {
    handlers::stats_handler(db_config).await
}

#[get("/health")]
pub async fn health(db_config: &State<DatabaseConfig>) -> Result<Json<&'static str>, ApiError> {
    handlers::health_handler(db_config).await
}

#[options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        success: false,
        error: "Invalid request format".to_string(),
        error_code: "BAD_REQUEST".to_string(),
        suggestions: vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    })
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        success: false,
        error: "Resource not found".to_string(),
        error_code: "NOT_FOUND".to_string(),
        suggestions: vec!["Check the request path and identifier".to_string()],
    })
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        success: false,
        error: "Internal server error".to_string(),
        error_code: "INTERNAL_ERROR".to_string(),
        suggestions: vec![
            "Try again in a few moments".to_string(),
            "Check the server logs if the problem persists".to_string(),
        ],
    })
}

// Main server start function
pub async fn start_web_server(environment: EnvironmentConfig, port: u16) -> Result<()> {
    environment.ensure_directories().await?;

    let mut db_config = DatabaseConfig::new(environment.database_path.clone());

    if let Err(e) = db_config.init_pool().await {
        error!("Failed to initialize database: {}", e);
        return Err(e);
    }

    if let Err(e) = db_config.migrate().await {
        error!("Failed to run database migrations: {}", e);
        return Err(e);
    }

    let server_config = ServerConfig {
        merged_jobs_path: environment.merged_jobs_path.clone(),
    };

    info!("Starting job tracker API server");
    info!("Database: {}", db_config.database_path.display());
    info!("Merged jobs file: {}", server_config.merged_jobs_path.display());

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(server_config)
        .manage(db_config)
        .register("/api", catchers![bad_request, not_found, internal_error])
        .mount(
            "/api",
            routes![
                list_jobs,
                create_job,
                get_job,
                update_job,
                delete_job,
                browse_jobs,
                list_applications,
                upsert_application,
                get_application,
                update_application,
                delete_application,
                list_interviews,
                create_interview,
                update_interview,
                delete_interview,
                import_jobs,
                get_stats,
                health,
                all_options,
            ],
        )
        .launch()
        .await;

    Ok(())
}
