// src/test_fixtures.rs
use chrono::Utc;

use crate::types::job::Job;

/// Minimal job record for unit tests; callers override the fields they care
/// about.
pub fn job(id: i64, company: &str, match_score: i64, tech_stack: Option<Vec<&str>>) -> Job {
    Job {
        id,
        external_id: None,
        job_url: format!("https://boards.greenhouse.io/{}/jobs/{}", company.to_lowercase(), id),
        ats_platform: None,
        company: company.to_string(),
        role: "Software Engineer".to_string(),
        location: None,
        salary: None,
        found_date: None,
        match_score,
        requirements: None,
        tech_stack: tech_stack.map(|tags| tags.into_iter().map(str::to_string).collect()),
        responsibilities: None,
        why_good_fit: None,
        experience_to_highlight: None,
        questions_to_ask: None,
        status: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
