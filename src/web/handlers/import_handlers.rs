// src/web/handlers/import_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::database::DatabaseConfig;
use crate::import::{import_jobs, ImportSummary, RawJob};
use crate::web::types::{ApiError, ImportRequest, ServerConfig};

pub async fn import_handler(
    request: Json<ImportRequest>,
    config: &State<ServerConfig>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<ImportSummary>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;
    let request = request.into_inner();
    let source = request.source.as_deref().unwrap_or("merged");

    let raw_jobs: Vec<RawJob> = match source {
        "file" => request.jobs.ok_or_else(|| {
            ApiError::bad_request("source \"file\" requires an inline jobs list".to_string())
        })?,
        "merged" => {
            let path = &config.merged_jobs_path;
            let content = match tokio::fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Merged jobs file unavailable at {}: {}", path.display(), e);
                    return Err(ApiError::not_found(
                        "No merged jobs file found. Run the scrapers first.".to_string(),
                    ));
                }
            };
            serde_json::from_str(&content).map_err(|e| {
                ApiError::bad_request(format!("Merged jobs file is not valid JSON: {}", e))
            })?
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown import source: {}",
                other
            )))
        }
    };

    if raw_jobs.is_empty() {
        return Err(ApiError::bad_request("No jobs found to import".to_string()));
    }

    info!("Importing {} jobs from source \"{}\"", raw_jobs.len(), source);

    let summary = import_jobs(pool, raw_jobs)
        .await
        .map_err(ApiError::database)?;

    Ok(Json(summary))
}
