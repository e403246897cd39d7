use serde::{Deserialize, Serialize};

use crate::engagement::EngagementSummary;
use crate::response::{Category, ModelRecord, TrendStrength};
use crate::sentiment::SentimentLabel;
use crate::stats::StatisticalAnalysis;

/// Scores further apart than this are averaged.
pub const SCORE_GAP_THRESHOLD: f64 = 2.0;
pub const TOP_KEYWORDS_IN_RESULT: usize = 5;

/// Statistical context attached to a final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpSummary {
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub top_keywords: Vec<String>,
    pub engagement: EngagementSummary,
    pub lexical_diversity: f64,
}

/// The fused trend assessment for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    /// Always within 1..=10.
    pub score: u8,
    pub category: Category,
    pub trend_strength: TrendStrength,
    pub nlp_analysis: Option<NlpSummary>,
    pub score_adjusted: bool,
}

///Final score for a model score and a 0–10 statistical score.
///Returns the model score unchanged unless the two differ by more than
///[`SCORE_GAP_THRESHOLD`], in which case their mean is rounded half-to-even.
/// # Example
/// ```
/// use trend_analysis::reconcile_scores;
/// assert_eq!(reconcile_scores(9.0, 4), (6, true));
/// assert_eq!(reconcile_scores(6.0, 7), (7, false));
/// ```
pub fn reconcile_scores(statistical: f64, model: u8) -> (u8, bool) {
    let model_f = f64::from(model);
    if (statistical - model_f).abs() > SCORE_GAP_THRESHOLD {
        let mean = ((statistical + model_f) / 2.0).round_ties_even();
        (mean.clamp(1.0, 10.0) as u8, true)
    } else {
        (model.clamp(1, 10), false)
    }
}

///Merges the model's verdict with the statistical branch, when there is one.
pub fn reconcile(record: ModelRecord, statistical: Option<&StatisticalAnalysis>) -> AnalysisResult {
    let Some(stats) = statistical else {
        return AnalysisResult {
            summary: record.summary,
            score: record.score.clamp(1, 10),
            category: record.category,
            trend_strength: record.trend_strength,
            nlp_analysis: None,
            score_adjusted: false,
        };
    };

    let (score, score_adjusted) = reconcile_scores(stats.score(), record.score);
    AnalysisResult {
        summary: record.summary,
        score,
        category: record.category,
        trend_strength: record.trend_strength,
        nlp_analysis: Some(NlpSummary {
            sentiment_label: stats.sentiment.fused.label,
            sentiment_score: stats.score(),
            top_keywords: stats.top_terms(TOP_KEYWORDS_IN_RESULT),
            engagement: stats.engagement,
            lexical_diversity: stats.text_stats.lexical_diversity,
        }),
        score_adjusted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordEntry;
    use crate::sentiment::{FusedSentiment, SentimentReport};
    use crate::stats::TextStats;

    fn stats_with_score(score: f64) -> StatisticalAnalysis {
        StatisticalAnalysis {
            sentiment: SentimentReport {
                fused: FusedSentiment::from_score(score),
                ..SentimentReport::default()
            },
            keywords: ["a", "b", "c", "d", "e", "f"]
                .iter()
                .map(|t| KeywordEntry { term: t.to_string(), count: 1 })
                .collect(),
            engagement: EngagementSummary { average: 1200.0, sample_count: 2 },
            text_stats: TextStats { word_count: 4, unique_words: 3, lexical_diversity: 0.75 },
        }
    }

    fn record(score: u8) -> ModelRecord {
        ModelRecord {
            summary: "Trending".into(),
            score,
            category: Category::Technology,
            trend_strength: TrendStrength::Rising,
        }
    }

    #[test]
    fn test_reconcile_scores_rule() {
        assert_eq!(reconcile_scores(9.0, 4), (6, true));
        assert_eq!(reconcile_scores(6.0, 7), (7, false));
        assert_eq!(reconcile_scores(5.0, 7), (7, false));
        assert_eq!(reconcile_scores(4.9, 7), (6, true));
        assert_eq!(reconcile_scores(0.0, 1), (1, false));
        // 1.5 rounds to even
        assert_eq!(reconcile_scores(0.0, 3), (2, true));
        assert_eq!(reconcile_scores(10.0, 1), (6, true));
    }

    #[test]
    fn test_reconcile_scores_exhaustive_properties() {
        for model in 1..=10u8 {
            for tenth in 0..=100 {
                let stat = tenth as f64 / 10.0;
                let (score, adjusted) = reconcile_scores(stat, model);
                assert!((1..=10).contains(&score));
                if (stat - model as f64).abs() > 2.0 {
                    assert!(adjusted);
                    let mean = ((stat + model as f64) / 2.0).round_ties_even().max(1.0);
                    assert_eq!(score as f64, mean);
                } else {
                    assert!(!adjusted);
                    assert_eq!(score, model);
                }
            }
        }
    }

    #[test]
    fn test_reconcile_with_stats() {
        let stats = stats_with_score(9.0);
        let r = reconcile(record(4), Some(&stats));
        assert_eq!(r.score, 6);
        assert!(r.score_adjusted);
        assert_eq!(r.summary, "Trending");
        assert_eq!(r.category, Category::Technology);
        assert_eq!(r.trend_strength, TrendStrength::Rising);
        let nlp = r.nlp_analysis.unwrap();
        assert_eq!(nlp.top_keywords, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(nlp.sentiment_label, SentimentLabel::Positive);
        assert_eq!(nlp.lexical_diversity, 0.75);
    }

    #[test]
    fn test_reconcile_without_stats() {
        let r = reconcile(record(8), None);
        assert_eq!(r.score, 8);
        assert!(!r.score_adjusted);
        assert!(r.nlp_analysis.is_none());
    }

    #[test]
    fn test_worst_case_is_well_formed() {
        let r = reconcile(ModelRecord::default(), None);
        assert_eq!(r.score, 5);
        assert_eq!(r.category, Category::Unknown);
        assert_eq!(r.trend_strength, TrendStrength::Medium);
        assert!(!r.summary.is_empty());
    }
}
