// src/utils.rs
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

static SALARY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)").expect("invalid salary regex"));

/// Extract a comparable number from free-form salary text: the first run of
/// digits, with comma grouping allowed ("$120,000" -> 120000, "$95k-ish" ->
/// 95). Text with no digits degrades to 0 rather than failing.
pub fn extract_salary_number(salary: Option<&str>) -> i64 {
    let Some(text) = salary else { return 0 };
    SALARY_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok())
        .unwrap_or(0)
}

/// Parse a discovery-date string into a sortable epoch timestamp. Accepts
/// RFC 3339 timestamps and plain `YYYY-MM-DD` dates; anything else (or a
/// missing date) maps to the epoch so it sinks to the end of a descending
/// date sort.
pub fn found_date_timestamp(found_date: Option<&str>) -> i64 {
    let Some(text) = found_date else { return 0 };

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp();
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc().timestamp();
        }
    }

    0
}

/// Collapse a location string to its display key: anything mentioning
/// "Remote" is just "Remote", otherwise the text before the first comma
/// (city without region/country). Missing locations key as "Unknown".
pub fn normalize_location(location: Option<&str>) -> String {
    match location {
        Some(text) if text.contains("Remote") => "Remote".to_string(),
        Some(text) => text.split(',').next().unwrap_or(text).trim().to_string(),
        None => "Unknown".to_string(),
    }
}

/// Current UTC timestamp, used for created_at/updated_at columns.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
