// src/scoring.rs
//! Match-score classification shared by every consumer (stats buckets, badge
//! labels, server-side score distribution). Thresholds live here and nowhere
//! else.

use serde::{Deserialize, Serialize};

pub const PRIORITY_THRESHOLD: i64 = 90;
pub const HIGH_THRESHOLD: i64 = 85;
pub const GOOD_THRESHOLD: i64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Priority,
    High,
    Good,
    Low,
}

impl ScoreCategory {
    /// Classify a match score. Total over all integers: anything below the
    /// lowest threshold (including negatives) is `Low`, anything at or above
    /// 90 (including >100) is `Priority`.
    pub fn of(score: i64) -> Self {
        if score >= PRIORITY_THRESHOLD {
            ScoreCategory::Priority
        } else if score >= HIGH_THRESHOLD {
            ScoreCategory::High
        } else if score >= GOOD_THRESHOLD {
            ScoreCategory::Good
        } else {
            ScoreCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Priority => "priority",
            ScoreCategory::High => "high",
            ScoreCategory::Good => "good",
            ScoreCategory::Low => "low",
        }
    }

    /// Display label as shown on score badges and distribution cards.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreCategory::Priority => "Priority (90+)",
            ScoreCategory::High => "High Match (85-89)",
            ScoreCategory::Good => "Good Match (80-84)",
            ScoreCategory::Low => "Below 80",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(ScoreCategory::of(90), ScoreCategory::Priority);
        assert_eq!(ScoreCategory::of(89), ScoreCategory::High);
        assert_eq!(ScoreCategory::of(85), ScoreCategory::High);
        assert_eq!(ScoreCategory::of(84), ScoreCategory::Good);
        assert_eq!(ScoreCategory::of(80), ScoreCategory::Good);
        assert_eq!(ScoreCategory::of(79), ScoreCategory::Low);
    }

    #[test]
    fn test_total_over_all_integers() {
        assert_eq!(ScoreCategory::of(-5), ScoreCategory::Low);
        assert_eq!(ScoreCategory::of(0), ScoreCategory::Low);
        assert_eq!(ScoreCategory::of(100), ScoreCategory::Priority);
        assert_eq!(ScoreCategory::of(250), ScoreCategory::Priority);
    }

    #[test]
    fn test_partition_is_non_overlapping() {
        // Every score lands in exactly one bucket; walking the line crosses
        // each boundary once.
        let mut seen = Vec::new();
        for score in 70..100 {
            let cat = ScoreCategory::of(score);
            if seen.last() != Some(&cat) {
                seen.push(cat);
            }
        }
        assert_eq!(
            seen,
            vec![
                ScoreCategory::Low,
                ScoreCategory::Good,
                ScoreCategory::High,
                ScoreCategory::Priority
            ]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(ScoreCategory::of(92).label(), "Priority (90+)");
        assert_eq!(ScoreCategory::of(81).label(), "Good Match (80-84)");
    }
}
