// src/types/application.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an application stands. No enforced transition graph: the UI can set
/// any state from any other. The single automatic transition is interview
/// creation forcing `Interviewing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Reviewing,
    Applied,
    PhoneScreen,
    Interviewing,
    Offer,
    Rejected,
    Declined,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::PhoneScreen => "phone_screen",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Statuses that count as having heard back from the company, used by the
    /// response-rate stat.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::PhoneScreen
                | ApplicationStatus::Interviewing
                | ApplicationStatus::Offer
                | ApplicationStatus::Rejected
                | ApplicationStatus::Declined
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ApplicationStatus::New),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "applied" => Ok(ApplicationStatus::Applied),
            "phone_screen" => Ok(ApplicationStatus::PhoneScreen),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "declined" => Ok(ApplicationStatus::Declined),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(anyhow::anyhow!("Unknown application status: {}", other)),
        }
    }
}

/// Tracking record for one job. At most one per job, created lazily when the
/// job is imported or first touched; never deleted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_discussed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_version: Option<String>,
    pub cover_letter_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviews: Option<Vec<Interview>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for POST /applications: targets a job, updates the existing
/// application if one exists, creates it otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpsert {
    pub job_id: i64,
    pub status: Option<ApplicationStatus>,
    pub applied_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub next_step: Option<String>,
    pub next_step_date: Option<DateTime<Utc>>,
    pub salary_discussed: Option<String>,
    pub notes: Option<String>,
    pub resume_version: Option<String>,
    pub cover_letter_used: Option<bool>,
    pub referral: Option<String>,
}

/// Partial update for PATCH /applications/<id>.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub applied_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub next_step: Option<String>,
    pub next_step_date: Option<DateTime<Utc>>,
    pub salary_discussed: Option<String>,
    pub notes: Option<String>,
    pub resume_version: Option<String>,
    pub cover_letter_used: Option<bool>,
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewOutcome {
    Pending,
    Passed,
    Failed,
    Cancelled,
}

impl InterviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewOutcome::Pending => "pending",
            InterviewOutcome::Passed => "passed",
            InterviewOutcome::Failed => "failed",
            InterviewOutcome::Cancelled => "cancelled",
        }
    }
}

impl FromStr for InterviewOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InterviewOutcome::Pending),
            "passed" => Ok(InterviewOutcome::Passed),
            "failed" => Ok(InterviewOutcome::Failed),
            "cancelled" => Ok(InterviewOutcome::Cancelled),
            other => Err(anyhow::anyhow!("Unknown interview outcome: {}", other)),
        }
    }
}

/// One interview round on an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: i64,
    pub application_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    pub interviewer_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<InterviewOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload for POST /interviews.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterview {
    pub application_id: i64,
    pub interview_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub interviewer_names: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for PATCH /interviews/<id>.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPatch {
    pub interview_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub interviewer_names: Option<Vec<String>>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub outcome: Option<InterviewOutcome>,
}

/// Human-readable label for an interview round, falling back to the raw type
/// tag for values outside the well-known set.
pub fn interview_type_label(interview_type: Option<&str>) -> String {
    match interview_type {
        None => "Interview".to_string(),
        Some("phone_screen") => "Phone Screen".to_string(),
        Some("technical") => "Technical".to_string(),
        Some("behavioral") => "Behavioral".to_string(),
        Some("system_design") => "System Design".to_string(),
        Some("hiring_manager") => "Hiring Manager".to_string(),
        Some("team_fit") => "Team Fit".to_string(),
        Some("final_round") => "Final Round".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ApplicationStatus::New,
            ApplicationStatus::PhoneScreen,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_response_statuses() {
        assert!(ApplicationStatus::PhoneScreen.is_response());
        assert!(ApplicationStatus::Rejected.is_response());
        assert!(!ApplicationStatus::New.is_response());
        assert!(!ApplicationStatus::Applied.is_response());
    }

    #[test]
    fn test_interview_type_label() {
        assert_eq!(interview_type_label(Some("phone_screen")), "Phone Screen");
        assert_eq!(interview_type_label(Some("onsite_bbq")), "onsite_bbq");
        assert_eq!(interview_type_label(None), "Interview");
    }
}
