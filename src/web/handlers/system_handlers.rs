// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::database::{DatabaseConfig, StatsRepository, TrackerStats};
use crate::web::types::ApiError;

pub async fn health_handler(db_config: &State<DatabaseConfig>) -> Result<Json<&'static str>, ApiError> {
    db_config.health_check().await.map_err(ApiError::database)?;
    info!("Health check passed");
    Ok(Json("OK"))
}

/// Server-side pipeline statistics (count/group-by over the store). Score
/// buckets share the classifier with the in-memory aggregator.
pub async fn stats_handler(
    db_config: &State<DatabaseConfig>,
) -> Result<Json<TrackerStats>, ApiError> {
    let pool = db_config.pool().map_err(ApiError::database)?;

    let stats = StatsRepository::new(pool)
        .collect()
        .await
        .map_err(ApiError::database)?;

    Ok(Json(stats))
}
