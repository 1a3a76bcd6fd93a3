// src/import.rs
//! Adapter from raw scraped job objects to the canonical record shape. The
//! scraper fleet is inconsistent about field spelling (snake_case and
//! camelCase variants of the same concept), so every aliased spelling is
//! accepted here, in one place, and nowhere downstream.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::types::application::ApplicationStatus;
use crate::types::job::{AtsPlatform, NewJob};

/// A job object as emitted by the scrapers. Everything is optional; the
/// normalization step decides what is actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "externalId")]
    pub external_id: Option<String>,
    #[serde(default, alias = "jobUrl")]
    pub job_url: Option<String>,
    #[serde(default, alias = "atsPlatform")]
    pub ats_platform: Option<String>,
    #[serde(default, alias = "companyName")]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default, alias = "foundDate")]
    pub found_date: Option<String>,
    #[serde(default, alias = "matchScore")]
    pub match_score: Option<i64>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default, alias = "techStack")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default)]
    pub responsibilities: Option<Vec<String>>,
    #[serde(default, alias = "whyGoodFit")]
    pub why_good_fit: Option<String>,
    #[serde(default, alias = "experienceToHighlight")]
    pub experience_to_highlight: Option<Vec<String>>,
    #[serde(default, alias = "questionsToAsk")]
    pub questions_to_ask: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RawJob {
    /// Map to the canonical insert shape. A record without a source URL is
    /// rejected (it cannot be deduplicated); company and role fall back to
    /// placeholders the way a half-scraped posting is still worth keeping.
    /// A missing external identifier gets a generated one.
    pub fn normalize(self) -> Result<NewJob> {
        let Some(job_url) = self.job_url.filter(|url| !url.trim().is_empty()) else {
            anyhow::bail!(
                "Job missing URL: {}",
                self.role.as_deref().unwrap_or("unknown")
            );
        };

        let ats_platform = match self.ats_platform.as_deref() {
            Some(tag) => match tag.parse::<AtsPlatform>() {
                Ok(platform) => Some(platform),
                Err(_) => {
                    warn!("Ignoring unknown ATS platform tag: {}", tag);
                    None
                }
            },
            None => None,
        };

        let external_id = self
            .external_id
            .or(self.id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(NewJob {
            external_id: Some(external_id),
            job_url,
            ats_platform,
            company: self.company.unwrap_or_else(|| "Unknown".to_string()),
            role: self.role.unwrap_or_else(|| "Unknown".to_string()),
            location: self.location,
            salary: self.salary,
            found_date: self.found_date,
            match_score: self.match_score.unwrap_or(0),
            requirements: self.requirements,
            tech_stack: self.tech_stack,
            responsibilities: self.responsibilities,
            why_good_fit: self.why_good_fit,
            experience_to_highlight: self.experience_to_highlight,
            questions_to_ask: self.questions_to_ask,
            status: self.status,
        })
    }
}

/// Scrapers tag their best finds "priority"; those start in `Reviewing`,
/// everything else starts in `New`.
pub fn initial_application_status(job: &NewJob) -> ApplicationStatus {
    if job.status.as_deref() == Some("priority") {
        ApplicationStatus::Reviewing
    } else {
        ApplicationStatus::New
    }
}

/// Import a batch against the store: normalize each record, skip URLs that
/// are already tracked, create the job plus its application record, and
/// collect per-record failures without aborting the batch.
pub async fn import_jobs(pool: &sqlx::SqlitePool, raw_jobs: Vec<RawJob>) -> Result<ImportSummary> {
    use crate::database::{ApplicationRepository, JobRepository};

    let total = raw_jobs.len();
    let mut imported = 0;
    let mut skipped = 0;
    let mut errors = Vec::new();

    let job_repo = JobRepository::new(pool);
    let application_repo = ApplicationRepository::new(pool);

    for raw in raw_jobs {
        let new_job = match raw.normalize() {
            Ok(job) => job,
            Err(e) => {
                errors.push(e.to_string());
                continue;
            }
        };

        match job_repo.find_by_url(&new_job.job_url).await {
            Ok(Some(_)) => {
                skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                errors.push(format!("Failed to import {}: {}", new_job.job_url, e));
                continue;
            }
        }

        let status = initial_application_status(&new_job);
        let result = async {
            let job = job_repo.create(&new_job).await?;
            application_repo.create_for_job(job.id, status).await?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => imported += 1,
            Err(e) => errors.push(format!("Failed to import {}: {}", new_job.job_url, e)),
        }
    }

    tracing::info!(
        "Import finished: {} imported, {} skipped, {} errors out of {}",
        imported,
        skipped,
        errors.len(),
        total
    );

    Ok(ImportSummary::new(imported, skipped, total, errors))
}

/// Outcome of one import run. Only the first ten per-record errors are
/// reported back.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub const MAX_REPORTED_ERRORS: usize = 10;

    pub fn new(imported: usize, skipped: usize, total: usize, mut errors: Vec<String>) -> Self {
        errors.truncate(Self::MAX_REPORTED_ERRORS);
        Self {
            imported,
            skipped,
            total,
            errors,
        }
    }
}
