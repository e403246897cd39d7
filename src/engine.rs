//! Per-document orchestration: statistical branch, prompt, model call,
//! reply parsing and score reconciliation.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::fusion::{AnalysisResult, reconcile};
use crate::keywords;
use crate::model::ModelClient;
use crate::prompt::build_prompt;
use crate::response::{ModelRecord, parse};
use crate::source::is_blocked;
use crate::stats::StatisticalAnalyzer;
use crate::tokenize::{Lexicon, Tokenizer};

/// Raw text handed over by a source, with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub text: String,
    pub query: String,
}

impl RawDocument {
    pub fn new(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            query: query.into(),
        }
    }
}

pub struct TrendEngine<C: ModelClient> {
    settings: Settings,
    client: C,
    statistical: Option<StatisticalAnalyzer>,
    // used for corpus keywords when the statistical branch is absent
    default_lexicon: Lexicon,
}

impl<C: ModelClient> TrendEngine<C> {
    pub fn new(settings: Settings, client: C, statistical: Option<StatisticalAnalyzer>) -> Self {
        Self {
            settings,
            client,
            statistical,
            default_lexicon: Lexicon::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn has_statistical_branch(&self) -> bool {
        self.statistical.is_some()
    }

    /// Stopword and suffix tables the engine tokenizes with.
    pub fn lexicon(&self) -> &Lexicon {
        self.statistical
            .as_ref()
            .map_or(&self.default_lexicon, StatisticalAnalyzer::lexicon)
    }

    ///Analyzes one document. Returns `None` only when the source reported that it
    ///was blocked; every other failure is folded into the result.
    pub fn analyze(&self, doc: &RawDocument) -> Option<AnalysisResult> {
        if is_blocked(&doc.text) {
            warn!("Source blocked for query {:?}, skipping", doc.query);
            return None;
        }

        let stats = self.statistical.as_ref().and_then(|analyzer| {
            analyzer
                .analyze(&doc.text)
                .inspect_err(|e| warn!("Statistical analysis skipped for {:?}: {e}", doc.query))
                .ok()
        });

        let prompt = build_prompt(
            &doc.text,
            &doc.query,
            stats.as_ref(),
            self.settings.prompt_char_budget,
        );
        let record = match self.client.complete(&prompt) {
            Ok(reply) => parse(&reply),
            Err(e) => {
                warn!("Model call failed for {:?}: {e}", doc.query);
                ModelRecord::fallback(&e)
            }
        };

        let result = reconcile(record, stats.as_ref());
        if result.score_adjusted {
            info!(
                "Score for {:?} adjusted to {} after statistical cross-check",
                doc.query, result.score
            );
        }
        Some(result)
    }

    ///Top `n` terms across several documents, ranked by TF-IDF. Uses the statistical
    ///branch's stopwords when present, the built-in tables otherwise.
    pub fn corpus_keywords(&self, documents: &[String], n: usize) -> Vec<String> {
        keywords::corpus_keywords(documents, &Tokenizer::new(self.lexicon()), n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, Result};
    use crate::model::DisabledModel;
    use crate::response::{Category, TrendStrength};
    use std::sync::Mutex;

    struct Canned {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelClient for Canned {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct TimesOut;

    impl ModelClient for TimesOut {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(AnalysisError::ModelTimeout(std::time::Duration::from_secs(1)))
        }
    }

    fn analyzer() -> Option<StatisticalAnalyzer> {
        Some(StatisticalAnalyzer::new(Lexicon::default()))
    }

    #[test]
    fn test_blocked_document_yields_nothing() {
        let engine = TrendEngine::new(Settings::default(), Canned::new("{}"), analyzer());
        let doc = RawDocument::new("TERDETEKSI BOT: Google memblokir request ini (Captcha).", "q");
        assert!(engine.analyze(&doc).is_none());
        assert!(engine.client.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_model_reply_flows_into_result() {
        let reply = r#"```json
{"summary": "Konser ramai dibicarakan", "score": 8, "category": "Entertainment", "trend_strength": "Viral"}
```"#;
        let engine = TrendEngine::new(Settings::default(), Canned::new(reply), analyzer());
        let doc = RawDocument::new("Konser keren banget! 12rb likes", "konser");
        let result = engine.analyze(&doc).unwrap();
        assert_eq!(result.summary, "Konser ramai dibicarakan");
        assert_eq!(result.category, Category::Entertainment);
        assert_eq!(result.trend_strength, TrendStrength::Viral);
        assert!((1..=10).contains(&result.score));
        let nlp = result.nlp_analysis.unwrap();
        assert_eq!(nlp.engagement.sample_count, 1);

        let prompts = engine.client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("NLP ANALYSIS CONTEXT"));
    }

    #[test]
    fn test_model_failure_still_completes() {
        let engine = TrendEngine::new(Settings::default(), TimesOut, analyzer());
        let result = engine
            .analyze(&RawDocument::new("great awesome product", "gadget"))
            .unwrap();
        assert!(result.summary.contains("model error"));
        assert_eq!(result.category, Category::Unknown);
        assert!(result.nlp_analysis.is_some());
    }

    #[test]
    fn test_both_branches_absent() {
        let engine = TrendEngine::new(Settings::default(), DisabledModel, None);
        let result = engine.analyze(&RawDocument::new("anything", "q")).unwrap();
        assert_eq!(result.score, 5);
        assert_eq!(result.category, Category::Unknown);
        assert_eq!(result.trend_strength, TrendStrength::Medium);
        assert!(result.nlp_analysis.is_none());
        assert!(!result.score_adjusted);
    }

    #[test]
    fn test_empty_text_drops_statistics_only() {
        let engine = TrendEngine::new(
            Settings::default(),
            Canned::new(r#"{"summary":"sepi","score":2,"category":"Other","trend_strength":"Declining"}"#),
            analyzer(),
        );
        let result = engine.analyze(&RawDocument::new("   ", "q")).unwrap();
        assert!(result.nlp_analysis.is_none());
        assert_eq!(result.score, 2);
        assert_eq!(result.trend_strength, TrendStrength::Declining);
    }

    #[test]
    fn test_corpus_keywords_without_statistical_branch() {
        let engine = TrendEngine::new(Settings::default(), DisabledModel, None);
        let docs = vec![
            "festival musik jakarta".to_string(),
            "festival kuliner bandung".to_string(),
        ];
        let top = engine.corpus_keywords(&docs, 3);
        assert_eq!(top.len(), 3);
        assert!(engine.corpus_keywords(&docs[..1], 3).is_empty());
        assert!(std::ptr::eq(engine.lexicon(), engine.lexicon()));
    }

    #[test]
    fn test_lexicon_comes_from_statistical_branch() {
        let dir = tempfile::tempdir().unwrap();
        let stopwords = dir.path().join("stop.txt");
        std::fs::write(&stopwords, "festival\n").unwrap();
        let analyzer = StatisticalAnalyzer::try_init(Some(&stopwords));
        let engine = TrendEngine::new(Settings::default(), DisabledModel, analyzer);
        assert!(engine.lexicon().is_stopword("festival"));
        let docs = vec![
            "festival musik jakarta".to_string(),
            "festival kuliner bandung".to_string(),
        ];
        assert!(!engine.corpus_keywords(&docs, 10).iter().any(|t| t.contains("festival")));
    }
}
