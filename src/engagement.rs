use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Average of the engagement numbers found in a text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub average: f64,
    pub sample_count: usize,
}

// Order matters only for logging; every pattern contributes its matches.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+(?:\.\d+)?)\s*(?:rb|ribu)\b",
        r"(\d+(?:\.\d+)?)\s*(?:jt|juta)\b",
        r"(\d+(?:\.\d+)?)\s*k\b",
        r"(\d+(?:\.\d+)?)\s*m\b",
        r"(\d+(?:\.\d+)?)\s*(?:views|likes|shares?|comments|subscribers|followers)\b",
        r"(\d+(?:,\d+)+)\b",
        r"(\d+)\s*(?:x\b|×|times\b)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid engagement regex"))
    .collect()
});

// A magnitude token counts when it stands alone or directly follows a digit.
static THOUSAND_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\d])(?:rb|ribu)\b").expect("valid magnitude regex"));
static MILLION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\d])(?:jt|juta)\b").expect("valid magnitude regex"));
static THOUSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\d])k\b").expect("valid magnitude regex"));
static MILLION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\d])m\b").expect("valid magnitude regex"));

///One multiplier for the whole text, chosen by the first magnitude token family present
///anywhere in it: `rb/ribu`, then `jt/juta`, then `k`, then `m`.
fn document_multiplier(text: &str) -> f64 {
    // token match, not substring: the "k" in "likes" is no magnitude
    if THOUSAND_ID.is_match(text) {
        1_000.0
    } else if MILLION_ID.is_match(text) {
        1_000_000.0
    } else if THOUSAND.is_match(text) {
        1_000.0
    } else if MILLION.is_match(text) {
        1_000_000.0
    } else {
        1.0
    }
}

///Extracts view/like/share style numbers and returns their mean.
/// # Example
/// ```
/// use trend_analysis::extract_engagement;
/// let summary = extract_engagement("video ini ditonton 10rb kali");
/// assert_eq!(summary.average, 10000.0);
/// assert_eq!(summary.sample_count, 1);
/// ```
pub fn extract_engagement(text: &str) -> EngagementSummary {
    if text.trim().is_empty() {
        return EngagementSummary::default();
    }
    let lower = text.to_lowercase();
    let multiplier = document_multiplier(&lower);

    let mut total = 0.0;
    let mut count = 0usize;
    for pattern in PATTERNS.iter() {
        for caps in pattern.captures_iter(&lower) {
            let raw = &caps[1];
            match raw.replace(',', "").parse::<f64>() {
                Ok(value) => {
                    total += value * multiplier;
                    count += 1;
                    debug!("Engagement number {raw} -> {}", value * multiplier);
                }
                Err(e) => debug!("Skipping engagement number {raw}: {e}"),
            }
        }
    }

    if count == 0 {
        return EngagementSummary::default();
    }
    EngagementSummary {
        average: ((total / count as f64) * 100.0).round() / 100.0,
        sample_count: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indonesian_thousands() {
        let s = extract_engagement("video ini ditonton 10rb kali");
        assert_eq!(s.average, 10000.0);
        assert!(s.sample_count >= 1);
    }

    #[test]
    fn test_no_numbers() {
        assert_eq!(
            extract_engagement("tidak ada angka di sini"),
            EngagementSummary { average: 0.0, sample_count: 0 }
        );
        assert_eq!(extract_engagement(""), EngagementSummary::default());
    }

    #[test]
    fn test_millions_and_nouns() {
        let s = extract_engagement("Klip itu tembus 2 juta penonton");
        assert_eq!(s.average, 2_000_000.0);
        assert_eq!(s.sample_count, 1);

        let s = extract_engagement("500 likes and 1500 comments");
        assert_eq!(s.sample_count, 2);
        assert_eq!(s.average, 1000.0);
    }

    #[test]
    fn test_comma_grouped_numbers() {
        let s = extract_engagement("total 1,250,000 so far");
        assert_eq!(s.sample_count, 1);
        assert_eq!(s.average, 1_250_000.0);
    }

    #[test]
    fn test_multiplier_applies_to_whole_document() {
        // "500 views" also gets the rb multiplier from the other number
        let s = extract_engagement("10rb share, 500 views");
        assert_eq!(s.sample_count, 2);
        assert_eq!(s.average, 255_000.0);
    }

    #[test]
    fn test_magnitude_letters_inside_words_are_ignored() {
        let s = extract_engagement("500 likes");
        assert_eq!(s.average, 500.0);
        assert_eq!(s.sample_count, 1);
        let s = extract_engagement("1.5k views");
        assert_eq!(s.average, 1500.0);
    }

    #[test]
    fn test_letters_inside_words_are_not_magnitudes() {
        // "like" and "make" contain k/m but are not magnitude tokens
        let s = extract_engagement("people like to make 3 times more noise");
        assert_eq!(s.average, 3.0);
        assert_eq!(s.sample_count, 1);
    }
}
