#![forbid(unsafe_code)]
//! # trend_analysis
//!
//! Scores how much a topic is trending from raw text scraped off social and
//! search platforms. Every document goes through two independent branches:
//!
//! - a lexicon-based statistical branch (normalization, Indonesian/English
//!   tokenizing and stemming, keyword frequency, engagement numbers, and two
//!   sentiment estimators fused on a 0–10 scale)
//! - a generative model asked for a JSON verdict (summary, score, category,
//!   trend strength)
//!
//! The two are reconciled into one [`AnalysisResult`]. The model score is kept
//! unless the statistical score disagrees by more than two points, in which
//! case both are averaged. Neither branch failing ever aborts an analysis.
//!
//! ## Example
//! ```
//! use trend_analysis::{DisabledModel, Lexicon, RawDocument, Settings, StatisticalAnalyzer, TrendEngine};
//!
//! let engine = TrendEngine::new(
//!     Settings::default(),
//!     DisabledModel,
//!     Some(StatisticalAnalyzer::new(Lexicon::default())),
//! );
//! let result = engine
//!     .analyze(&RawDocument::new("Konsernya keren banget! 12rb likes", "konser"))
//!     .unwrap();
//! assert!((1..=10).contains(&result.score));
//! assert!(result.nlp_analysis.is_some());
//! ```

pub mod config;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod keywords;
pub mod model;
pub mod preprocess;
pub mod prompt;
pub mod report;
pub mod response;
pub mod sentiment;
pub mod source;
pub mod stats;
pub mod storage;
pub mod tokenize;

pub use config::Settings;
pub use engagement::{EngagementSummary, extract_engagement};
pub use engine::{RawDocument, TrendEngine};
pub use error::{AnalysisError, Result};
pub use fusion::{AnalysisResult, NlpSummary, reconcile, reconcile_scores};
pub use keywords::{KeywordEntry, corpus_keywords, count_terms, top_keywords};
pub use model::{DisabledModel, ModelClient, OllamaClient};
pub use preprocess::normalize;
pub use prompt::build_prompt;
pub use report::{TrendReport, render, render_summary};
pub use response::{Category, ModelRecord, TrendStrength, parse};
pub use sentiment::{FusedSentiment, SentimentLabel, SentimentReport, estimate};
pub use source::{BLOCKED_MARKER, DumpFile, Platform, TextSource, collect_files};
pub use stats::{StatisticalAnalysis, StatisticalAnalyzer};
pub use storage::{CsvStore, TrendRow, csv_safe_cell};
pub use tokenize::{Lexicon, SuffixFamily, Tokenizer, strip_suffix};
