// src/query.rs
//! Filter and sort pipeline over an in-memory job collection. Every operation
//! is a pure pass over its input and returns a fresh vector; callers re-run
//! the pipeline whenever the collection or the filter state changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::job::Job;
use crate::utils::{extract_salary_number, found_date_timestamp};

/// Case-insensitive substring search over company, role, location and tech
/// tags. An empty query matches everything (every string contains the empty
/// substring); skipping the call for empty input is the caller's concern,
/// not handled here.
pub fn search_jobs(jobs: &[Job], query: &str) -> Vec<Job> {
    let lower_query = query.to_lowercase();
    jobs.iter()
        .filter(|job| {
            job.company.to_lowercase().contains(&lower_query)
                || job.role.to_lowercase().contains(&lower_query)
                || job
                    .location
                    .as_ref()
                    .is_some_and(|loc| loc.to_lowercase().contains(&lower_query))
                || job.tech_stack.as_ref().is_some_and(|tags| {
                    tags.iter()
                        .any(|tech| tech.to_lowercase().contains(&lower_query))
                })
        })
        .cloned()
        .collect()
}

/// Keep jobs scoring at or above the threshold. A threshold of 0 literally
/// keeps every score >= 0; treating 0 as "no filter" is a UI convention that
/// lives in [`JobQuery::run`], not here.
pub fn filter_by_score(jobs: &[Job], min_score: i64) -> Vec<Job> {
    jobs.iter()
        .filter(|job| job.match_score >= min_score)
        .cloned()
        .collect()
}

/// Keep jobs carrying at least one of the selected tags (OR semantics),
/// compared case-insensitively. Jobs without a tag list never match.
pub fn filter_by_tech(jobs: &[Job], selected: &[String]) -> Vec<Job> {
    let selected_lower: Vec<String> = selected.iter().map(|t| t.to_lowercase()).collect();
    jobs.iter()
        .filter(|job| {
            job.tech_stack.as_ref().is_some_and(|tags| {
                tags.iter()
                    .any(|tech| selected_lower.contains(&tech.to_lowercase()))
            })
        })
        .cloned()
        .collect()
}

/// Drop jobs whose id is in the hidden set — or, in show-hidden-only mode,
/// keep exactly those (the predicate inverts instead of stacking).
pub fn filter_hidden(jobs: &[Job], hidden_ids: &HashSet<i64>, show_hidden_only: bool) -> Vec<Job> {
    jobs.iter()
        .filter(|job| {
            if show_hidden_only {
                hidden_ids.contains(&job.id)
            } else {
                !hidden_ids.contains(&job.id)
            }
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Score,
    Date,
    Company,
    Salary,
}

/// Stable, non-mutating sort. Score and date sort descending with missing or
/// unparseable dates at the epoch (they sink to the end); company sorts
/// ascending on the case-folded name; salary sorts descending on the number
/// extracted from the salary text, with no extractable number treated as 0.
/// Ties keep their prior relative order.
pub fn sort_jobs(jobs: &[Job], sort_by: SortKey) -> Vec<Job> {
    let mut sorted = jobs.to_vec();
    match sort_by {
        SortKey::Score => sorted.sort_by(|a, b| b.match_score.cmp(&a.match_score)),
        SortKey::Date => sorted.sort_by(|a, b| {
            found_date_timestamp(b.found_date.as_deref())
                .cmp(&found_date_timestamp(a.found_date.as_deref()))
        }),
        SortKey::Company => {
            sorted.sort_by(|a, b| a.company.to_lowercase().cmp(&b.company.to_lowercase()))
        }
        SortKey::Salary => sorted.sort_by(|a, b| {
            extract_salary_number(b.salary.as_deref())
                .cmp(&extract_salary_number(a.salary.as_deref()))
        }),
    }
    sorted
}

/// One browse request's filter state. `run` composes the operations above in
/// the conventional pipeline order: hidden -> text -> score -> tech -> sort.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub min_score: Option<i64>,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub hidden_ids: Vec<i64>,
    #[serde(default)]
    pub show_hidden_only: bool,
    #[serde(default)]
    pub sort_by: SortKey,
}

impl JobQuery {
    pub fn run(&self, jobs: &[Job]) -> Vec<Job> {
        let hidden: HashSet<i64> = self.hidden_ids.iter().copied().collect();
        let mut current = if hidden.is_empty() && !self.show_hidden_only {
            jobs.to_vec()
        } else {
            filter_hidden(jobs, &hidden, self.show_hidden_only)
        };

        if let Some(query) = self.search.as_deref() {
            if !query.trim().is_empty() {
                current = search_jobs(&current, query);
            }
        }

        // min_score 0 means "no filter" here, by convention only.
        if let Some(min_score) = self.min_score {
            if min_score > 0 {
                current = filter_by_score(&current, min_score);
            }
        }

        if !self.tech.is_empty() {
            current = filter_by_tech(&current, &self.tech);
        }

        sort_jobs(&current, self.sort_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::job;

    fn ids(jobs: &[Job]) -> Vec<i64> {
        jobs.iter().map(|j| j.id).collect()
    }

    #[test]
    fn test_search_matches_all_indexed_fields() {
        let mut by_role = job(1, "Acme", 85, None);
        by_role.role = "Platform Engineer".to_string();
        let mut by_location = job(2, "Beta", 85, None);
        by_location.location = Some("Remote (EU)".to_string());
        let by_tech = job(3, "Gamma", 85, Some(vec!["PostgreSQL"]));
        let by_company = job(4, "Platform Nine", 85, None);
        let jobs = vec![by_role, by_location, by_tech, by_company];

        assert_eq!(ids(&search_jobs(&jobs, "platform")), vec![1, 4]);
        assert_eq!(ids(&search_jobs(&jobs, "remote")), vec![2]);
        assert_eq!(ids(&search_jobs(&jobs, "postgres")), vec![3]);
        assert!(search_jobs(&jobs, "kubernetes").is_empty());
    }

    #[test]
    fn test_search_empty_query_returns_everything() {
        let jobs = vec![job(1, "Acme", 92, None), job(2, "Beta", 81, None)];
        assert_eq!(ids(&search_jobs(&jobs, "")), vec![1, 2]);
    }

    #[test]
    fn test_filter_by_score_inclusive_threshold() {
        let jobs = vec![
            job(1, "Acme", 92, Some(vec!["Go"])),
            job(2, "Beta", 81, Some(vec!["Rust"])),
        ];
        assert_eq!(ids(&filter_by_score(&jobs, 85)), vec![1]);
        assert_eq!(ids(&filter_by_score(&jobs, 81)), vec![1, 2]);
    }

    #[test]
    fn test_filter_by_score_zero_keeps_everything() {
        let jobs = vec![
            job(1, "Acme", 0, None),
            job(2, "Beta", 95, None),
            job(3, "Gamma", 42, None),
        ];
        assert_eq!(filter_by_score(&jobs, 0).len(), 3);
    }

    #[test]
    fn test_tech_filter_or_semantics() {
        let jobs = vec![
            job(1, "Acme", 85, Some(vec!["Go", "Kubernetes"])),
            job(2, "Beta", 85, Some(vec!["Rust"])),
            job(3, "Gamma", 85, Some(vec!["Python"])),
            job(4, "Delta", 85, None),
        ];
        let selected = vec!["rust".to_string(), "GO".to_string()];
        // Matching any one selected tag is enough; untagged jobs never match.
        assert_eq!(ids(&filter_by_tech(&jobs, &selected)), vec![1, 2]);
    }

    #[test]
    fn test_hidden_filter_and_inversion() {
        let jobs = vec![job(1, "Acme", 85, None), job(2, "Beta", 85, None)];
        let hidden: HashSet<i64> = [2].into_iter().collect();

        assert_eq!(ids(&filter_hidden(&jobs, &hidden, false)), vec![1]);
        assert_eq!(ids(&filter_hidden(&jobs, &hidden, true)), vec![2]);
    }

    #[test]
    fn test_sort_by_score_descending() {
        let jobs = vec![
            job(1, "Acme", 81, None),
            job(2, "Beta", 95, None),
            job(3, "Gamma", 88, None),
        ];
        assert_eq!(ids(&sort_jobs(&jobs, SortKey::Score)), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let jobs = vec![
            job(1, "Acme", 81, None),
            job(2, "Beta", 95, None),
            job(3, "Gamma", 95, None),
        ];
        let once = sort_jobs(&jobs, SortKey::Score);
        let twice = sort_jobs(&once, SortKey::Score);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_sort_stability_on_equal_keys() {
        let jobs = vec![
            job(1, "Acme", 90, None),
            job(2, "Beta", 90, None),
            job(3, "Gamma", 90, None),
        ];
        // Equal scores keep their prior relative order.
        assert_eq!(ids(&sort_jobs(&jobs, SortKey::Score)), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_date_missing_dates_sink() {
        let mut newest = job(1, "Acme", 85, None);
        newest.found_date = Some("2025-07-01".to_string());
        let mut oldest = job(2, "Beta", 85, None);
        oldest.found_date = Some("2025-01-15".to_string());
        let mut garbled = job(3, "Gamma", 85, None);
        garbled.found_date = Some("last tuesday".to_string());
        let missing = job(4, "Delta", 85, None);

        let sorted = sort_jobs(&[missing, oldest, garbled, newest], SortKey::Date);
        assert_eq!(ids(&sorted)[..2], [1, 2]);
        // Epoch-dated records (missing or unparseable) share last place.
        assert_eq!(ids(&sorted)[2..], [4, 3]);
    }

    #[test]
    fn test_sort_by_company_case_folded() {
        let jobs = vec![
            job(1, "beta", 85, None),
            job(2, "Acme", 85, None),
            job(3, "gamma", 85, None),
        ];
        assert_eq!(ids(&sort_jobs(&jobs, SortKey::Company)), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_salary_scenario() {
        let mut a = job(1, "Acme", 85, None);
        a.salary = Some("$120,000".to_string());
        let mut b = job(2, "Beta", 85, None);
        b.salary = Some("$95k-ish".to_string());
        let mut c = job(3, "Gamma", 85, None);
        c.salary = Some("no data".to_string());

        let sorted = sort_jobs(&[c, b, a], SortKey::Salary);
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn test_pipeline_composition() {
        let mut visible = job(1, "Acme", 92, Some(vec!["Go"]));
        visible.role = "Backend Engineer".to_string();
        let mut low_score = job(2, "Beta", 70, Some(vec!["Go"]));
        low_score.role = "Backend Engineer".to_string();
        let mut hidden = job(3, "Gamma", 95, Some(vec!["Go"]));
        hidden.role = "Backend Engineer".to_string();
        let mut wrong_tech = job(4, "Delta", 95, Some(vec!["Rust"]));
        wrong_tech.role = "Backend Engineer".to_string();

        let query = JobQuery {
            search: Some("backend".to_string()),
            min_score: Some(85),
            tech: vec!["go".to_string()],
            hidden_ids: vec![3],
            ..Default::default()
        };

        let result = query.run(&[visible, low_score, hidden, wrong_tech]);
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_pipeline_min_score_zero_is_no_filter() {
        let jobs = vec![job(1, "Acme", 0, None), job(2, "Beta", -5, None)];
        let query = JobQuery {
            min_score: Some(0),
            ..Default::default()
        };
        // Both survive: a 0 threshold is skipped entirely, so even negative
        // scores stay.
        assert_eq!(query.run(&jobs).len(), 2);
    }

    #[test]
    fn test_pipeline_show_hidden_only() {
        let jobs = vec![job(1, "Acme", 92, None), job(2, "Beta", 81, None)];
        let query = JobQuery {
            hidden_ids: vec![2],
            show_hidden_only: true,
            ..Default::default()
        };
        assert_eq!(ids(&query.run(&jobs)), vec![2]);
    }
}
