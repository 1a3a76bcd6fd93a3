// src/database.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::scoring::ScoreCategory;
use crate::types::application::{
    Application, ApplicationPatch, ApplicationStatus, Interview, InterviewOutcome, InterviewPatch,
    NewInterview,
};
use crate::types::job::{AtsPlatform, Job, JobPatch, NewJob};
use crate::utils::now;

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await?;

        self.pool = Some(pool);

        info!("Database connection pool initialized: {}", database_url);
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Database pool not initialized. Call init_pool() first.")
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT,
                job_url TEXT NOT NULL UNIQUE,
                ats_platform TEXT,
                company TEXT NOT NULL,
                role TEXT NOT NULL,
                location TEXT,
                salary TEXT,
                found_date TEXT,
                match_score INTEGER NOT NULL DEFAULT 0,
                requirements TEXT,
                tech_stack TEXT,
                responsibilities TEXT,
                why_good_fit TEXT,
                experience_to_highlight TEXT,
                questions_to_ask TEXT,
                status TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL UNIQUE REFERENCES jobs(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'new',
                applied_date TEXT,
                response_date TEXT,
                next_step TEXT,
                next_step_date TEXT,
                salary_discussed TEXT,
                notes TEXT,
                resume_version TEXT,
                cover_letter_used BOOLEAN NOT NULL DEFAULT FALSE,
                referral TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                application_id INTEGER NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
                interview_type TEXT,
                scheduled_at TEXT,
                duration_minutes INTEGER,
                interviewer_names TEXT,
                location TEXT,
                notes TEXT,
                feedback TEXT,
                outcome TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_match_score ON jobs(match_score);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_ats_platform ON jobs(ats_platform);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);")
            .execute(pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_interviews_application ON interviews(application_id);",
        )
        .execute(pool)
        .await?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool()?)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

/// True when a write failed on one of the UNIQUE columns (duplicate job URL).
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

// ===== Row decoding =====

fn decode_list(text: Option<String>) -> Option<Vec<String>> {
    text.and_then(|json| serde_json::from_str(&json).ok())
}

fn encode_list(list: Option<&Vec<String>>) -> Option<String> {
    list.and_then(|values| serde_json::to_string(values).ok())
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: i64,
    external_id: Option<String>,
    job_url: String,
    ats_platform: Option<String>,
    company: String,
    role: String,
    location: Option<String>,
    salary: Option<String>,
    found_date: Option<String>,
    match_score: i64,
    requirements: Option<String>,
    tech_stack: Option<String>,
    responsibilities: Option<String>,
    why_good_fit: Option<String>,
    experience_to_highlight: Option<String>,
    questions_to_ask: Option<String>,
    status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            external_id: row.external_id,
            job_url: row.job_url,
            ats_platform: row
                .ats_platform
                .as_deref()
                .and_then(|tag| AtsPlatform::from_str(tag).ok()),
            company: row.company,
            role: row.role,
            location: row.location,
            salary: row.salary,
            found_date: row.found_date,
            match_score: row.match_score,
            requirements: decode_list(row.requirements),
            tech_stack: decode_list(row.tech_stack),
            responsibilities: decode_list(row.responsibilities),
            why_good_fit: row.why_good_fit,
            experience_to_highlight: decode_list(row.experience_to_highlight),
            questions_to_ask: decode_list(row.questions_to_ask),
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const JOB_COLUMNS: &str = "id, external_id, job_url, ats_platform, company, role, location, \
     salary, found_date, match_score, requirements, tech_stack, responsibilities, why_good_fit, \
     experience_to_highlight, questions_to_ask, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: i64,
    job_id: i64,
    status: String,
    applied_date: Option<DateTime<Utc>>,
    response_date: Option<DateTime<Utc>>,
    next_step: Option<String>,
    next_step_date: Option<DateTime<Utc>>,
    salary_discussed: Option<String>,
    notes: Option<String>,
    resume_version: Option<String>,
    cover_letter_used: bool,
    referral: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id,
            job_id: row.job_id,
            status: row
                .status
                .parse()
                .unwrap_or(ApplicationStatus::New),
            applied_date: row.applied_date,
            response_date: row.response_date,
            next_step: row.next_step,
            next_step_date: row.next_step_date,
            salary_discussed: row.salary_discussed,
            notes: row.notes,
            resume_version: row.resume_version,
            cover_letter_used: row.cover_letter_used,
            referral: row.referral,
            interviews: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const APPLICATION_COLUMNS: &str = "id, job_id, status, applied_date, response_date, next_step, \
     next_step_date, salary_discussed, notes, resume_version, cover_letter_used, referral, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct InterviewRow {
    id: i64,
    application_id: i64,
    interview_type: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    duration_minutes: Option<i64>,
    interviewer_names: Option<String>,
    location: Option<String>,
    notes: Option<String>,
    feedback: Option<String>,
    outcome: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InterviewRow> for Interview {
    fn from(row: InterviewRow) -> Self {
        Interview {
            id: row.id,
            application_id: row.application_id,
            interview_type: row.interview_type,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            interviewer_names: decode_list(row.interviewer_names).unwrap_or_default(),
            location: row.location,
            notes: row.notes,
            feedback: row.feedback,
            outcome: row
                .outcome
                .as_deref()
                .and_then(|tag| InterviewOutcome::from_str(tag).ok()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const INTERVIEW_COLUMNS: &str = "id, application_id, interview_type, scheduled_at, \
     duration_minutes, interviewer_names, location, notes, feedback, outcome, created_at, \
     updated_at";

// ===== Job Repository =====

/// Optional narrowing for the job listing endpoint. This is store-side
/// narrowing for the REST listing; the in-memory pipeline in `query.rs` is
/// what the browse endpoint composes.
#[derive(Debug, Clone, Default)]
pub struct JobListFilter {
    pub search: Option<String>,
    pub min_score: Option<i64>,
    pub platform: Option<AtsPlatform>,
    pub status: Option<ApplicationStatus>,
    pub limit: i64,
    pub offset: i64,
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a job. Fails on a duplicate job URL (UNIQUE constraint);
    /// callers distinguish that case via [`is_unique_violation`].
    pub async fn create(&self, new_job: &NewJob) -> Result<Job> {
        let timestamp = now();

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (external_id, job_url, ats_platform, company, role, location,
                              salary, found_date, match_score, requirements, tech_stack,
                              responsibilities, why_good_fit, experience_to_highlight,
                              questions_to_ask, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_job.external_id)
        .bind(&new_job.job_url)
        .bind(new_job.ats_platform.map(|p| p.as_str()))
        .bind(&new_job.company)
        .bind(&new_job.role)
        .bind(&new_job.location)
        .bind(&new_job.salary)
        .bind(&new_job.found_date)
        .bind(new_job.match_score)
        .bind(encode_list(new_job.requirements.as_ref()))
        .bind(encode_list(new_job.tech_stack.as_ref()))
        .bind(encode_list(new_job.responsibilities.as_ref()))
        .bind(&new_job.why_good_fit)
        .bind(encode_list(new_job.experience_to_highlight.as_ref()))
        .bind(encode_list(new_job.questions_to_ask.as_ref()))
        .bind(&new_job.status)
        .bind(timestamp)
        .bind(timestamp)
        .execute(self.pool)
        .await?;

        let job_id = result.last_insert_rowid();
        info!("Created job {} ({} at {})", job_id, new_job.role, new_job.company);

        self.find(job_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Job {} vanished after insert", job_id))
    }

    pub async fn find(&self, id: i64) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE id = ?",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Job::from))
    }

    pub async fn find_by_url(&self, job_url: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE job_url = ?",
            JOB_COLUMNS
        ))
        .bind(job_url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Job::from))
    }

    /// Full collection, best first. The browse pipeline and stats aggregation
    /// start from this.
    pub async fn all(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs ORDER BY match_score DESC, found_date DESC",
            JOB_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Job::from).collect())
    }

    /// Store-side narrowed listing ordered by match score then discovery
    /// date, both descending.
    pub async fn list(&self, filter: &JobListFilter) -> Result<Vec<Job>> {
        let mut sql = format!("SELECT {} FROM jobs WHERE 1=1", JOB_COLUMNS);

        if filter.search.is_some() {
            sql.push_str(
                " AND (role LIKE ? COLLATE NOCASE OR company LIKE ? COLLATE NOCASE \
                 OR location LIKE ? COLLATE NOCASE)",
            );
        }
        if filter.min_score.is_some() {
            sql.push_str(" AND match_score >= ?");
        }
        if filter.platform.is_some() {
            sql.push_str(" AND ats_platform = ?");
        }
        if filter.status.is_some() {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM applications a WHERE a.job_id = jobs.id \
                 AND a.status = ?)",
            );
        }
        sql.push_str(" ORDER BY match_score DESC, found_date DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, JobRow>(&sql);
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            query = query
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern);
        }
        if let Some(min_score) = filter.min_score {
            query = query.bind(min_score);
        }
        if let Some(platform) = filter.platform {
            query = query.bind(platform.as_str());
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Job::from).collect())
    }

    /// Partial update; absent patch fields leave columns untouched.
    pub async fn update(&self, id: i64, patch: &JobPatch) -> Result<Option<Job>> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET company = COALESCE(?, company),
                role = COALESCE(?, role),
                location = COALESCE(?, location),
                salary = COALESCE(?, salary),
                found_date = COALESCE(?, found_date),
                match_score = COALESCE(?, match_score),
                ats_platform = COALESCE(?, ats_platform),
                tech_stack = COALESCE(?, tech_stack),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.company)
        .bind(&patch.role)
        .bind(&patch.location)
        .bind(&patch.salary)
        .bind(&patch.found_date)
        .bind(patch.match_score)
        .bind(patch.ats_platform.map(|p| p.as_str()))
        .bind(encode_list(patch.tech_stack.as_ref()))
        .bind(&patch.status)
        .bind(now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted job {}", id);
        }
        Ok(deleted)
    }

}

// ===== Application Repository =====

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tracking record for a job. One per job; a second create for
    /// the same job fails on the UNIQUE constraint.
    pub async fn create_for_job(
        &self,
        job_id: i64,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let timestamp = now();

        let result = sqlx::query(
            r#"
            INSERT INTO applications (job_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(job_id)
        .bind(status.as_str())
        .bind(timestamp)
        .bind(timestamp)
        .execute(self.pool)
        .await?;

        let application_id = result.last_insert_rowid();
        info!(
            "Created application {} for job {} with status {}",
            application_id, job_id, status
        );

        self.find(application_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Application {} vanished after insert", application_id))
    }

    pub async fn find(&self, id: i64) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Application::from))
    }

    pub async fn find_by_job(&self, job_id: i64) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE job_id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Application::from))
    }

    /// Application with its interview rounds attached.
    pub async fn find_with_interviews(&self, id: i64) -> Result<Option<Application>> {
        let Some(mut application) = self.find(id).await? else {
            return Ok(None);
        };

        let interviews = InterviewRepository::new(self.pool)
            .list_by_application(id)
            .await?;
        application.interviews = Some(interviews);
        Ok(Some(application))
    }

    /// All applications, most recently touched first, optionally narrowed by
    /// status.
    pub async fn list(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ApplicationRow>(&format!(
                    "SELECT {} FROM applications WHERE status = ? ORDER BY updated_at DESC",
                    APPLICATION_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ApplicationRow>(&format!(
                    "SELECT {} FROM applications ORDER BY updated_at DESC",
                    APPLICATION_COLUMNS
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Application::from).collect())
    }

    /// Partial update; absent patch fields leave columns untouched.
    pub async fn update(&self, id: i64, patch: &ApplicationPatch) -> Result<Option<Application>> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = COALESCE(?, status),
                applied_date = COALESCE(?, applied_date),
                response_date = COALESCE(?, response_date),
                next_step = COALESCE(?, next_step),
                next_step_date = COALESCE(?, next_step_date),
                salary_discussed = COALESCE(?, salary_discussed),
                notes = COALESCE(?, notes),
                resume_version = COALESCE(?, resume_version),
                cover_letter_used = COALESCE(?, cover_letter_used),
                referral = COALESCE(?, referral),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.applied_date)
        .bind(patch.response_date)
        .bind(&patch.next_step)
        .bind(patch.next_step_date)
        .bind(&patch.salary_discussed)
        .bind(&patch.notes)
        .bind(&patch.resume_version)
        .bind(patch.cover_letter_used)
        .bind(&patch.referral)
        .bind(now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(id).await
    }

    pub async fn set_status(&self, id: i64, status: ApplicationStatus) -> Result<()> {
        sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now())
            .bind(id)
            .execute(self.pool)
            .await?;

        info!("Application {} status set to {}", id, status);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ===== Interview Repository =====

pub struct InterviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InterviewRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an interview round. Side effect: the owning application is
    /// moved to `interviewing`, whatever its prior status.
    pub async fn create(&self, new_interview: &NewInterview) -> Result<Interview> {
        let timestamp = now();

        let result = sqlx::query(
            r#"
            INSERT INTO interviews (application_id, interview_type, scheduled_at,
                                    duration_minutes, interviewer_names, location, notes,
                                    created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_interview.application_id)
        .bind(&new_interview.interview_type)
        .bind(new_interview.scheduled_at)
        .bind(new_interview.duration_minutes)
        .bind(encode_list(Some(&new_interview.interviewer_names)))
        .bind(&new_interview.location)
        .bind(&new_interview.notes)
        .bind(timestamp)
        .bind(timestamp)
        .execute(self.pool)
        .await?;

        let interview_id = result.last_insert_rowid();

        ApplicationRepository::new(self.pool)
            .set_status(new_interview.application_id, ApplicationStatus::Interviewing)
            .await?;

        info!(
            "Created interview {} for application {}",
            interview_id, new_interview.application_id
        );

        self.find(interview_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Interview {} vanished after insert", interview_id))
    }

    pub async fn find(&self, id: i64) -> Result<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE id = ?",
            INTERVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Interview::from))
    }

    pub async fn list_by_application(&self, application_id: i64) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE application_id = ? ORDER BY scheduled_at ASC",
            INTERVIEW_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Interview::from).collect())
    }

    /// Interviews across all applications; `upcoming` keeps only future
    /// rounds still awaiting an outcome.
    pub async fn list(
        &self,
        upcoming: bool,
        application_id: Option<i64>,
    ) -> Result<Vec<Interview>> {
        let mut sql = format!("SELECT {} FROM interviews WHERE 1=1", INTERVIEW_COLUMNS);
        if upcoming {
            sql.push_str(" AND scheduled_at > ? AND (outcome IS NULL OR outcome = 'pending')");
        }
        if application_id.is_some() {
            sql.push_str(" AND application_id = ?");
        }
        sql.push_str(" ORDER BY scheduled_at ASC");

        let mut query = sqlx::query_as::<_, InterviewRow>(&sql);
        if upcoming {
            query = query.bind(now());
        }
        if let Some(application_id) = application_id {
            query = query.bind(application_id);
        }
        let rows = query.fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(Interview::from).collect())
    }

    /// Partial update; absent patch fields leave columns untouched.
    pub async fn update(&self, id: i64, patch: &InterviewPatch) -> Result<Option<Interview>> {
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET interview_type = COALESCE(?, interview_type),
                scheduled_at = COALESCE(?, scheduled_at),
                duration_minutes = COALESCE(?, duration_minutes),
                interviewer_names = COALESCE(?, interviewer_names),
                location = COALESCE(?, location),
                notes = COALESCE(?, notes),
                feedback = COALESCE(?, feedback),
                outcome = COALESCE(?, outcome),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.interview_type)
        .bind(patch.scheduled_at)
        .bind(patch.duration_minutes)
        .bind(encode_list(patch.interviewer_names.as_ref()))
        .bind(&patch.location)
        .bind(&patch.notes)
        .bind(&patch.feedback)
        .bind(patch.outcome.map(|o| o.as_str()))
        .bind(now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ===== Server-side statistics =====

/// Pipeline totals computed with count/group-by queries. The score buckets go
/// through [`ScoreCategory`] — the same classifier the in-memory aggregator
/// uses — so the two stats paths cannot drift apart.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub total_jobs: i64,
    pub by_status: HashMap<String, i64>,
    pub by_score: ScoreDistribution,
    pub by_platform: HashMap<String, i64>,
    pub upcoming_interviews: i64,
    pub applied_this_week: i64,
    pub response_rate: f64,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScoreDistribution {
    pub priority: i64,
    pub high: i64,
    pub good: i64,
    pub other: i64,
}

pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn collect(&self) -> Result<TrackerStats> {
        let total_jobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(self.pool)
            .await?;

        let status_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        // Applied/response totals come from the same group-by, classified in
        // Rust so the response set has one definition (is_response).
        let mut total_applied = 0i64;
        let mut total_responses = 0i64;
        for (tag, count) in &status_rows {
            if let Ok(status) = tag.parse::<ApplicationStatus>() {
                if status != ApplicationStatus::New {
                    total_applied += count;
                }
                if status.is_response() {
                    total_responses += count;
                }
            }
        }
        let by_status = status_rows.into_iter().collect();

        let score_rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT match_score, COUNT(*) FROM jobs GROUP BY match_score")
                .fetch_all(self.pool)
                .await?;
        let mut by_score = ScoreDistribution::default();
        for (score, count) in score_rows {
            match ScoreCategory::of(score) {
                ScoreCategory::Priority => by_score.priority += count,
                ScoreCategory::High => by_score.high += count,
                ScoreCategory::Good => by_score.good += count,
                ScoreCategory::Low => by_score.other += count,
            }
        }

        let platform_rows: Vec<(Option<String>, i64)> =
            sqlx::query_as("SELECT ats_platform, COUNT(*) FROM jobs GROUP BY ats_platform")
                .fetch_all(self.pool)
                .await?;
        let by_platform = platform_rows
            .into_iter()
            .map(|(platform, count)| (platform.unwrap_or_else(|| "unknown".to_string()), count))
            .collect();

        let upcoming_interviews: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM interviews \
             WHERE scheduled_at > ? AND (outcome IS NULL OR outcome = 'pending')",
        )
        .bind(now())
        .fetch_one(self.pool)
        .await?;

        let applied_this_week: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE applied_date >= ?")
                .bind(now() - Duration::days(7))
                .fetch_one(self.pool)
                .await?;

        let response_rate = if total_applied > 0 {
            (total_responses as f64 / total_applied as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Ok(TrackerStats {
            total_jobs: total_jobs.0,
            by_status,
            by_score,
            by_platform,
            upcoming_interviews: upcoming_interviews.0,
            applied_this_week: applied_this_week.0,
            response_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_db() -> DatabaseConfig {
        // One connection only: each in-memory SQLite connection is its own
        // database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();

        let mut config = DatabaseConfig::new(PathBuf::from(":memory:"));
        config.pool = Some(pool);
        config.migrate().await.unwrap();
        config
    }

    fn new_job(url: &str, company: &str, score: i64) -> NewJob {
        NewJob {
            external_id: None,
            job_url: url.to_string(),
            ats_platform: None,
            company: company.to_string(),
            role: "Software Engineer".to_string(),
            location: None,
            salary: None,
            found_date: None,
            match_score: score,
            requirements: None,
            tech_stack: Some(vec!["Rust".to_string()]),
            responsibilities: None,
            why_good_fit: None,
            experience_to_highlight: None,
            questions_to_ask: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_job_round_trip() {
        let config = test_db().await;
        let pool = config.pool().unwrap();
        let repo = JobRepository::new(pool);

        let created = repo
            .create(&new_job("https://boards.greenhouse.io/acme/1", "Acme", 92))
            .await
            .unwrap();
        let found = repo.find(created.id).await.unwrap().unwrap();

        assert_eq!(found.company, "Acme");
        assert_eq!(found.match_score, 92);
        assert_eq!(found.tech_stack.as_deref(), Some(&["Rust".to_string()][..]));
        assert_eq!(
            repo.find_by_url("https://boards.greenhouse.io/acme/1")
                .await
                .unwrap()
                .map(|job| job.id),
            Some(created.id)
        );
    }

    #[tokio::test]
    async fn test_duplicate_url_is_unique_violation() {
        let config = test_db().await;
        let repo = JobRepository::new(config.pool().unwrap());

        repo.create(&new_job("https://jobs.lever.co/beta/1", "Beta", 85))
            .await
            .unwrap();
        let err = repo
            .create(&new_job("https://jobs.lever.co/beta/1", "Beta", 85))
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_interview_creation_forces_interviewing_status() {
        let config = test_db().await;
        let pool = config.pool().unwrap();

        let job = JobRepository::new(pool)
            .create(&new_job("https://jobs.ashbyhq.com/gamma/1", "Gamma", 88))
            .await
            .unwrap();
        let application_repo = ApplicationRepository::new(pool);
        let application = application_repo
            .create_for_job(job.id, ApplicationStatus::New)
            .await
            .unwrap();
        application_repo
            .set_status(application.id, ApplicationStatus::Applied)
            .await
            .unwrap();

        InterviewRepository::new(pool)
            .create(&NewInterview {
                application_id: application.id,
                interview_type: Some("phone_screen".to_string()),
                scheduled_at: None,
                duration_minutes: Some(30),
                interviewer_names: vec!["Sam".to_string()],
                location: None,
                notes: None,
            })
            .await
            .unwrap();

        let reloaded = application_repo.find(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::Interviewing);
    }

    #[tokio::test]
    async fn test_deleting_job_cascades() {
        let config = test_db().await;
        let pool = config.pool().unwrap();

        let job = JobRepository::new(pool)
            .create(&new_job("https://apply.workable.com/delta/1", "Delta", 75))
            .await
            .unwrap();
        let application_repo = ApplicationRepository::new(pool);
        let application = application_repo
            .create_for_job(job.id, ApplicationStatus::New)
            .await
            .unwrap();

        assert!(JobRepository::new(pool).delete(job.id).await.unwrap());
        assert!(application_repo
            .find(application.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_application_patch_keeps_absent_fields() {
        let config = test_db().await;
        let pool = config.pool().unwrap();

        let job = JobRepository::new(pool)
            .create(&new_job("https://boards.greenhouse.io/eps/1", "Epsilon", 81))
            .await
            .unwrap();
        let repo = ApplicationRepository::new(pool);
        let application = repo
            .create_for_job(job.id, ApplicationStatus::New)
            .await
            .unwrap();

        repo.update(
            application.id,
            &ApplicationPatch {
                notes: Some("Referred by Dana".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let updated = repo
            .update(
                application.id,
                &ApplicationPatch {
                    status: Some(ApplicationStatus::Applied),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, ApplicationStatus::Applied);
        assert_eq!(updated.notes.as_deref(), Some("Referred by Dana"));
    }

    #[tokio::test]
    async fn test_stats_share_the_score_classifier() {
        let config = test_db().await;
        let pool = config.pool().unwrap();
        let repo = JobRepository::new(pool);

        for (i, score) in [95, 90, 87, 82, 60].iter().enumerate() {
            repo.create(&new_job(
                &format!("https://boards.greenhouse.io/zeta/{}", i),
                "Zeta",
                *score,
            ))
            .await
            .unwrap();
        }

        let stats = StatsRepository::new(pool).collect().await.unwrap();
        assert_eq!(stats.total_jobs, 5);
        assert_eq!(stats.by_score.priority, 2);
        assert_eq!(stats.by_score.high, 1);
        assert_eq!(stats.by_score.good, 1);
        assert_eq!(stats.by_score.other, 1);
    }

    #[tokio::test]
    async fn test_response_rate_counts_heard_back_statuses() {
        let config = test_db().await;
        let pool = config.pool().unwrap();
        let job_repo = JobRepository::new(pool);
        let application_repo = ApplicationRepository::new(pool);

        for (i, status) in [
            ApplicationStatus::New,
            ApplicationStatus::Applied,
            ApplicationStatus::Rejected,
        ]
        .into_iter()
        .enumerate()
        {
            let job = job_repo
                .create(&new_job(
                    &format!("https://jobs.lever.co/eta/{}", i),
                    "Eta",
                    85,
                ))
                .await
                .unwrap();
            application_repo
                .create_for_job(job.id, status)
                .await
                .unwrap();
        }

        let stats = StatsRepository::new(pool).collect().await.unwrap();
        // Two applications moved past `new`; one of them heard back.
        assert_eq!(stats.response_rate, 50.0);
        assert_eq!(stats.by_status.get("new"), Some(&1));
        assert_eq!(stats.by_status.get("rejected"), Some(&1));
    }
}
