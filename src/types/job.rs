// src/types/job.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Applicant-tracking platforms the scraper knows how to crawl. A closed set:
/// stats always report all four, even at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsPlatform {
    Greenhouse,
    Lever,
    Ashby,
    Workable,
}

impl AtsPlatform {
    pub const ALL: [AtsPlatform; 4] = [
        AtsPlatform::Greenhouse,
        AtsPlatform::Lever,
        AtsPlatform::Ashby,
        AtsPlatform::Workable,
    ];

    /// Hosting domain used for URL inference.
    pub fn domain(&self) -> &'static str {
        match self {
            AtsPlatform::Greenhouse => "boards.greenhouse.io",
            AtsPlatform::Lever => "jobs.lever.co",
            AtsPlatform::Ashby => "jobs.ashbyhq.com",
            AtsPlatform::Workable => "apply.workable.com",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AtsPlatform::Greenhouse => "Greenhouse",
            AtsPlatform::Lever => "Lever",
            AtsPlatform::Ashby => "Ashby",
            AtsPlatform::Workable => "Workable",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AtsPlatform::Greenhouse => "greenhouse",
            AtsPlatform::Lever => "lever",
            AtsPlatform::Ashby => "ashby",
            AtsPlatform::Workable => "workable",
        }
    }

    /// Infer the platform from a posting URL: case-insensitive substring test
    /// against each known domain, first match in table order wins. `None`
    /// means the platform is undetermined, not an error.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|platform| lower.contains(platform.domain()))
    }
}

impl fmt::Display for AtsPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AtsPlatform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greenhouse" => Ok(AtsPlatform::Greenhouse),
            "lever" => Ok(AtsPlatform::Lever),
            "ashby" => Ok(AtsPlatform::Ashby),
            "workable" => Ok(AtsPlatform::Workable),
            other => Err(anyhow::anyhow!("Unknown ATS platform: {}", other)),
        }
    }
}

/// One discovered job posting as stored and served. List-valued fields are
/// kept optional: a missing tech stack means "no tags", never a wildcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub job_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_platform: Option<AtsPlatform>,
    pub company: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_date: Option<String>,
    pub match_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_good_fit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_to_highlight: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions_to_ask: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    /// Effective platform: the explicit tag when present, otherwise inferred
    /// from the posting URL.
    pub fn platform(&self) -> Option<AtsPlatform> {
        self.ats_platform
            .or_else(|| AtsPlatform::from_url(&self.job_url))
    }
}

/// Canonical insert shape produced by the import adapter and the create
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub external_id: Option<String>,
    pub job_url: String,
    pub ats_platform: Option<AtsPlatform>,
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub found_date: Option<String>,
    pub match_score: i64,
    pub requirements: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub why_good_fit: Option<String>,
    pub experience_to_highlight: Option<Vec<String>>,
    pub questions_to_ask: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Partial update for PATCH /jobs/<id>. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub found_date: Option<String>,
    pub match_score: Option<i64>,
    pub ats_platform: Option<AtsPlatform>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_url() {
        assert_eq!(
            AtsPlatform::from_url("https://boards.greenhouse.io/acme/jobs/123"),
            Some(AtsPlatform::Greenhouse)
        );
        assert_eq!(
            AtsPlatform::from_url("https://JOBS.LEVER.CO/beta/456"),
            Some(AtsPlatform::Lever)
        );
        assert_eq!(
            AtsPlatform::from_url("https://careers.example.com/jobs/1"),
            None
        );
    }

    #[test]
    fn test_platform_first_match_wins() {
        // Contrived URL mentioning two known domains: table order decides.
        let url = "https://boards.greenhouse.io/redirect?to=jobs.lever.co/x";
        assert_eq!(AtsPlatform::from_url(url), Some(AtsPlatform::Greenhouse));
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!(
            "greenhouse".parse::<AtsPlatform>().unwrap(),
            AtsPlatform::Greenhouse
        );
        assert_eq!(
            "Workable".parse::<AtsPlatform>().unwrap(),
            AtsPlatform::Workable
        );
        assert!("taleo".parse::<AtsPlatform>().is_err());
    }

    #[test]
    fn test_platform_names() {
        for platform in AtsPlatform::ALL {
            assert_eq!(platform.as_str().parse::<AtsPlatform>().unwrap(), platform);
            assert_eq!(
                platform.display_name().to_lowercase(),
                platform.as_str()
            );
        }
    }
}
