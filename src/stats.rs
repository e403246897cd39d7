use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engagement::{EngagementSummary, extract_engagement};
use crate::error::{AnalysisError, Result};
use crate::keywords::{KeywordEntry, top_keywords};
use crate::preprocess::normalize;
use crate::sentiment::{SentimentReport, estimate};
use crate::tokenize::{Lexicon, Tokenizer, lexical_diversity};

/// How many keywords the statistical branch keeps per document.
pub const KEYWORD_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub unique_words: usize,
    pub lexical_diversity: f64,
}

/// Everything the lexicon-based branch knows about one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalAnalysis {
    pub sentiment: SentimentReport,
    pub keywords: Vec<KeywordEntry>,
    pub engagement: EngagementSummary,
    pub text_stats: TextStats,
}

impl StatisticalAnalysis {
    /// Fused sentiment score rounded to two decimals, 0–10.
    pub fn score(&self) -> f64 {
        round2(self.sentiment.fused.score)
    }

    pub fn top_terms(&self, n: usize) -> Vec<String> {
        self.keywords.iter().take(n).map(|k| k.term.clone()).collect()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// The optional statistical branch. Built once at startup; when construction
/// fails the engine runs without it.
#[derive(Debug, Clone)]
pub struct StatisticalAnalyzer {
    lexicon: Lexicon,
}

impl StatisticalAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    ///Builds the analyzer from the built-in tables plus an optional stopword file.
    ///Returns `None` (and logs why) when the tables cannot be loaded.
    pub fn try_init(extra_stopwords: Option<&Path>) -> Option<Self> {
        match Lexicon::load(extra_stopwords) {
            Ok(lexicon) => Some(Self::new(lexicon)),
            Err(e) => {
                warn!("Statistical analysis disabled: {e}");
                None
            }
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn tokenizer(&self) -> Tokenizer<'_> {
        Tokenizer::new(&self.lexicon)
    }

    ///Runs sentiment, keyword, engagement and text statistics over one raw document.
    pub fn analyze(&self, raw_text: &str) -> Result<StatisticalAnalysis> {
        let normalized = normalize(raw_text);
        if normalized.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        debug!("Statistical analysis over {} chars", raw_text.len());

        let sentiment = estimate(&normalized);
        let tokens = self.tokenizer().tokenize(raw_text);
        let keywords = top_keywords(&tokens, KEYWORD_LIMIT);
        let engagement = extract_engagement(raw_text);
        let unique: HashSet<&String> = tokens.iter().collect();
        let text_stats = TextStats {
            word_count: tokens.len(),
            unique_words: unique.len(),
            lexical_diversity: round2(lexical_diversity(&tokens)),
        };

        let fused = sentiment.fused.score;
        if !(0.0..=10.0).contains(&fused) || fused.is_nan() {
            return Err(AnalysisError::StatisticalPipelineFailure(format!(
                "fused score out of range: {fused}"
            )));
        }

        debug!(
            "Statistical result: {} ({:.2}/10), {} keywords, {} engagement samples",
            sentiment.fused.label,
            fused,
            keywords.len(),
            engagement.sample_count
        );
        Ok(StatisticalAnalysis {
            sentiment,
            keywords,
            engagement,
            text_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_empty_input() {
        let analyzer = StatisticalAnalyzer::new(Lexicon::default());
        assert!(matches!(analyzer.analyze("   "), Err(AnalysisError::EmptyInput)));
        assert!(matches!(analyzer.analyze("🎉🎉"), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn test_full_branch() {
        let analyzer = StatisticalAnalyzer::new(Lexicon::default());
        let text = "Konser keren banget! konser ditonton 10rb kali, konser mantap #konser";
        let a = analyzer.analyze(text).unwrap();
        assert_eq!(a.keywords[0].term, "konser");
        assert_eq!(a.keywords[0].count, 4);
        assert_eq!(a.engagement.average, 10000.0);
        assert!((0.0..=1.0).contains(&a.text_stats.lexical_diversity));
        assert!((0.0..=10.0).contains(&a.score()));
        assert!(a.top_terms(5).len() <= 5);
    }

    #[test]
    fn test_try_init_missing_stopword_file() {
        assert!(StatisticalAnalyzer::try_init(Some(Path::new("/no/such/stopwords.txt"))).is_none());
        assert!(StatisticalAnalyzer::try_init(None).is_some());
    }
}
