//! Plain-text rendering of results for the terminal.

use std::collections::HashMap;
use std::fmt::Write;

use serde::Serialize;

use crate::fusion::AnalysisResult;
use crate::source::Platform;

const BAR_WIDTH: usize = 30;
const RULE_WIDTH: usize = 80;

/// A result together with where it came from; the unit of JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub platform: Platform,
    pub keyword: String,
    pub source: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

///Horizontal bar for a 0–10 value, e.g. `Overall Score        |█████░░░…| 5.0/10`.
pub fn bar(label: &str, value: f64) -> String {
    let ratio = (value / 10.0).clamp(0.0, 1.0);
    let filled = (BAR_WIDTH as f64 * ratio) as usize;
    format!(
        "{label:20} |{}{}| {value:.1}/10",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

/// Detailed block for one analyzed document.
pub fn render(platform: Platform, keyword: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();
    let rule = "─".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{:^80}", "TREND ANALYSIS");
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Keyword:        {keyword}");
    let _ = writeln!(out, "Platform:       {}", platform.name().to_uppercase());
    let _ = writeln!(out, "Category:       {}", result.category);
    let _ = writeln!(out, "Trend Strength: {}", result.trend_strength);
    let _ = writeln!(out);
    let _ = write!(out, "{}", bar("Overall Score", f64::from(result.score)));
    if result.score_adjusted {
        out.push_str(" (adjusted)");
    }
    out.push('\n');

    if let Some(nlp) = &result.nlp_analysis {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", bar("NLP Sentiment", nlp.sentiment_score));
        let _ = writeln!(out, "   Label: {}", nlp.sentiment_label);
        if !nlp.top_keywords.is_empty() {
            let _ = writeln!(out, "Top Keywords:      {}", nlp.top_keywords.join(", "));
        }
        if nlp.engagement.sample_count > 0 {
            let _ = writeln!(out, "Avg Engagement:    {}", nlp.engagement.average);
        }
        let _ = writeln!(out, "Lexical Diversity: {:.2}", nlp.lexical_diversity);
    }

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", result.summary);
    out
}

///Batch overview: per keyword the average score, best platform and a platform
///breakdown, followed by the category distribution over all reports.
pub fn render_summary(reports: &[TrendReport]) -> String {
    if reports.is_empty() {
        return "No data to report.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "TREND ANALYSIS SUMMARY REPORT");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Total Analysis: {}", reports.len());

    let mut keywords: Vec<&str> = Vec::new();
    for r in reports {
        if !keywords.contains(&r.keyword.as_str()) {
            keywords.push(&r.keyword);
        }
    }

    for keyword in keywords {
        let mut group: Vec<&TrendReport> = reports.iter().filter(|r| r.keyword == keyword).collect();
        group.sort_by(|a, b| b.result.score.cmp(&a.result.score));
        let avg = group.iter().map(|r| f64::from(r.result.score)).sum::<f64>() / group.len() as f64;

        let _ = writeln!(out, "\n{}", "─".repeat(RULE_WIDTH));
        let _ = writeln!(out, "KEYWORD: {}", keyword.to_uppercase());
        let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
        let _ = writeln!(out, "  Average Score:   {avg:.1}/10");
        if let Some(best) = group.first() {
            let _ = writeln!(out, "  Best Platform:   {} ({}/10)", best.platform, best.result.score);
        }
        let _ = writeln!(out, "  Total Platforms: {}", group.len());
        for r in &group {
            let _ = writeln!(
                out,
                "  - {:12} Score: {}/10 | {}",
                r.platform.name(),
                r.result.score,
                r.result.trend_strength
            );
        }
    }

    let mut categories: HashMap<String, usize> = HashMap::new();
    for r in reports {
        *categories.entry(r.result.category.to_string()).or_insert(0) += 1;
    }
    let mut categories: Vec<(String, usize)> = categories.into_iter().collect();
    categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let _ = writeln!(out, "\n{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "CATEGORIES");
    for (category, count) in categories {
        let _ = writeln!(out, "  {category:14} {count}");
    }
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Category, TrendStrength};

    fn report(platform: Platform, keyword: &str, score: u8, category: Category) -> TrendReport {
        TrendReport {
            platform,
            keyword: keyword.into(),
            source: format!("{platform}.txt"),
            result: AnalysisResult {
                summary: "ringkasan".into(),
                score,
                category,
                trend_strength: TrendStrength::Rising,
                nlp_analysis: None,
                score_adjusted: false,
            },
        }
    }

    #[test]
    fn test_bar_width() {
        let b = bar("Overall Score", 5.0);
        assert_eq!(b.matches('█').count(), 15);
        assert_eq!(b.matches('░').count(), 15);
        assert!(b.ends_with("5.0/10"));
        assert_eq!(bar("x", 42.0).matches('█').count(), 30);
    }

    #[test]
    fn test_render_without_statistics() {
        let r = report(Platform::Youtube, "konser", 8, Category::Entertainment);
        let text = render(r.platform, &r.keyword, &r.result);
        assert!(text.contains("Platform:       YOUTUBE"));
        assert!(text.contains("Category:       Entertainment"));
        assert!(!text.contains("NLP Sentiment"));
        assert!(text.trim_end().ends_with("ringkasan"));
    }

    #[test]
    fn test_render_summary_groups_by_keyword() {
        let reports = vec![
            report(Platform::Tiktok, "konser", 6, Category::Entertainment),
            report(Platform::Youtube, "konser", 9, Category::Entertainment),
            report(Platform::Google, "pemilu", 4, Category::SocialIssue),
        ];
        let text = render_summary(&reports);
        assert!(text.contains("Total Analysis: 3"));
        assert!(text.contains("KEYWORD: KONSER"));
        assert!(text.contains("Average Score:   7.5/10"));
        assert!(text.contains("Best Platform:   youtube (9/10)"));
        assert!(text.contains("Entertainment  2"));
        assert!(text.find("KONSER").unwrap() < text.find("PEMILU").unwrap());
    }

    #[test]
    fn test_report_json_is_flat() {
        let r = report(Platform::Twitter, "x", 5, Category::Other);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["platform"], "twitter");
        assert_eq!(json["score"], 5);
        assert!(json["nlp_analysis"].is_null());
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(render_summary(&[]), "No data to report.");
    }
}
