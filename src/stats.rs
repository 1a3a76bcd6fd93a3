// src/stats.rs
//! Derived statistics over a job collection. Pure projection: recomputed from
//! scratch on every call, never persisted, no state retained between calls.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::scoring::ScoreCategory;
use crate::types::job::{AtsPlatform, Job};
use crate::utils::normalize_location;

/// Aggregate view of a job collection. Frequency tables are sparse (no entry
/// for values that never occurred), except the ATS platform table whose four
/// keys come from a closed set and are always present.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: usize,
    pub priority: usize,
    pub high_match: usize,
    pub good_match: usize,
    pub other: usize,
    pub tech_stack_counts: HashMap<String, usize>,
    pub company_counts: HashMap<String, usize>,
    pub location_counts: HashMap<String, usize>,
    pub ats_platform_counts: BTreeMap<AtsPlatform, usize>,
}

impl JobStats {
    fn empty() -> Self {
        Self {
            total: 0,
            priority: 0,
            high_match: 0,
            good_match: 0,
            other: 0,
            tech_stack_counts: HashMap::new(),
            company_counts: HashMap::new(),
            location_counts: HashMap::new(),
            ats_platform_counts: AtsPlatform::ALL.iter().map(|p| (*p, 0)).collect(),
        }
    }
}

/// Single pass over the collection: score buckets, tech-tag frequencies
/// (case-sensitive — case folding is a filter-time concern), company
/// frequencies, normalized-location frequencies, and platform frequencies
/// (explicit tag or URL inference; undetermined platforms are not counted).
pub fn calculate_stats(jobs: &[Job]) -> JobStats {
    let mut stats = JobStats::empty();
    stats.total = jobs.len();

    for job in jobs {
        match ScoreCategory::of(job.match_score) {
            ScoreCategory::Priority => stats.priority += 1,
            ScoreCategory::High => stats.high_match += 1,
            ScoreCategory::Good => stats.good_match += 1,
            ScoreCategory::Low => stats.other += 1,
        }

        if let Some(tech_stack) = &job.tech_stack {
            for tech in tech_stack {
                *stats.tech_stack_counts.entry(tech.clone()).or_insert(0) += 1;
            }
        }

        *stats
            .company_counts
            .entry(job.company.clone())
            .or_insert(0) += 1;

        let location = normalize_location(job.location.as_deref());
        *stats.location_counts.entry(location).or_insert(0) += 1;

        if let Some(platform) = job.platform() {
            *stats.ats_platform_counts.entry(platform).or_insert(0) += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::job;

    #[test]
    fn test_empty_collection_yields_zero_stats() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(
            stats.priority + stats.high_match + stats.good_match + stats.other,
            0
        );
        assert!(stats.tech_stack_counts.is_empty());
        assert!(stats.company_counts.is_empty());
        assert!(stats.location_counts.is_empty());
        // The closed platform set is still reported, zero-filled.
        assert_eq!(stats.ats_platform_counts.len(), 4);
        assert!(stats.ats_platform_counts.values().all(|&n| n == 0));
    }

    #[test]
    fn test_two_job_scenario() {
        let jobs = vec![
            job(1, "Acme", 92, Some(vec!["Go"])),
            job(2, "Beta", 81, Some(vec!["Rust"])),
        ];

        let stats = calculate_stats(&jobs);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.priority, 1);
        assert_eq!(stats.high_match, 0);
        assert_eq!(stats.good_match, 1);
        assert_eq!(stats.other, 0);
        assert_eq!(stats.tech_stack_counts.get("Go"), Some(&1));
        assert_eq!(stats.tech_stack_counts.get("Rust"), Some(&1));
        assert_eq!(stats.company_counts.get("Acme"), Some(&1));
        assert_eq!(stats.company_counts.get("Beta"), Some(&1));
    }

    #[test]
    fn test_buckets_sum_to_total() {
        let jobs: Vec<_> = [95, 90, 88, 85, 82, 80, 60, 0, -3, 104]
            .iter()
            .enumerate()
            .map(|(i, &score)| job(i as i64, "Acme", score, None))
            .collect();

        let stats = calculate_stats(&jobs);
        assert_eq!(stats.total, jobs.len());
        assert_eq!(
            stats.priority + stats.high_match + stats.good_match + stats.other,
            stats.total
        );
    }

    #[test]
    fn test_tag_counts_are_case_sensitive() {
        let jobs = vec![
            job(1, "Acme", 85, Some(vec!["rust", "Rust"])),
            job(2, "Beta", 85, Some(vec!["Rust"])),
        ];

        let stats = calculate_stats(&jobs);
        assert_eq!(stats.tech_stack_counts.get("Rust"), Some(&2));
        assert_eq!(stats.tech_stack_counts.get("rust"), Some(&1));
    }

    #[test]
    fn test_location_normalization() {
        let mut remote = job(1, "Acme", 85, None);
        remote.location = Some("Remote (US timezones)".to_string());
        let mut city = job(2, "Beta", 85, None);
        city.location = Some("Berlin, Germany".to_string());
        let unknown = job(3, "Gamma", 85, None);

        let stats = calculate_stats(&[remote, city, unknown]);
        assert_eq!(stats.location_counts.get("Remote"), Some(&1));
        assert_eq!(stats.location_counts.get("Berlin"), Some(&1));
        assert_eq!(stats.location_counts.get("Unknown"), Some(&1));
        assert_eq!(stats.location_counts.len(), 3);
    }

    #[test]
    fn test_platform_counts_prefer_explicit_tag() {
        // Explicit tag wins over what the URL would suggest.
        let mut tagged = job(1, "Acme", 85, None);
        tagged.job_url = "https://jobs.lever.co/acme/1".to_string();
        tagged.ats_platform = Some(AtsPlatform::Greenhouse);

        // No tag: inferred from the URL.
        let mut inferred = job(2, "Beta", 85, None);
        inferred.job_url = "https://apply.workable.com/beta/2".to_string();

        // Neither tag nor known domain: undetermined, not counted.
        let mut unknown = job(3, "Gamma", 85, None);
        unknown.job_url = "https://careers.gamma.example/3".to_string();

        let stats = calculate_stats(&[tagged, inferred, unknown]);
        assert_eq!(stats.ats_platform_counts[&AtsPlatform::Greenhouse], 1);
        assert_eq!(stats.ats_platform_counts[&AtsPlatform::Lever], 0);
        assert_eq!(stats.ats_platform_counts[&AtsPlatform::Workable], 1);
        assert_eq!(stats.ats_platform_counts[&AtsPlatform::Ashby], 0);
        let counted: usize = stats.ats_platform_counts.values().sum();
        assert_eq!(counted, 2);
    }

    #[test]
    fn test_repeated_calls_share_no_state() {
        let jobs = vec![job(1, "Acme", 92, Some(vec!["Go"]))];
        let first = calculate_stats(&jobs);
        let second = calculate_stats(&jobs);
        assert_eq!(first, second);
        assert_eq!(calculate_stats(&[]).total, 0);
    }
}
