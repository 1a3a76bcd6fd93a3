// src/lib.rs
pub mod admin_cli;
pub mod database;
pub mod environment;
pub mod import;
pub mod query;
pub mod scoring;
pub mod stats;
pub mod types;
pub mod utils;
pub mod web;

#[cfg(test)]
mod test_fixtures;

pub use environment::EnvironmentConfig;
pub use query::{filter_by_score, filter_by_tech, filter_hidden, search_jobs, sort_jobs, JobQuery, SortKey};
pub use scoring::ScoreCategory;
pub use stats::{calculate_stats, JobStats};
pub use types::{Application, ApplicationStatus, AtsPlatform, Interview, Job};
pub use web::start_web_server;
