//! Two independent lexicon sentiment estimators and their fused 0–10 score.
//!
//! - **Valence**: VADER compound polarity in `[-1, 1]`.
//! - **Polarity**: adjective lexicon with intensifiers and negation, yielding
//!   polarity in `[-1, 1]` and subjectivity in `[0, 1]`. Covers English and
//!   common Indonesian social-media vocabulary.
//!
//! Both estimators read the normalized (not stemmed) text. A failure inside
//! either one is replaced by that method's neutral default.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use log::warn;
use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// Maps `[-1, 1]` onto `[0, 1]`.
fn unit(x: f64) -> f64 {
    (x.clamp(-1.0, 1.0) + 1.0) / 2.0
}

/// VADER result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValenceEstimate {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl ValenceEstimate {
    fn from_compound(compound: f64, positive: f64, neutral: f64, negative: f64) -> Self {
        let label = if compound >= 0.05 {
            SentimentLabel::Positive
        } else if compound <= -0.05 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Self {
            compound,
            positive,
            neutral,
            negative,
            label,
            confidence: compound.abs(),
        }
    }

    /// Compound polarity on the 0–10 scale.
    pub fn score(&self) -> f64 {
        unit(self.compound) * 10.0
    }
}

/// Polarity/subjectivity result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityEstimate {
    pub polarity: f64,
    pub subjectivity: f64,
    pub label: SentimentLabel,
}

impl PolarityEstimate {
    fn new(polarity: f64, subjectivity: f64) -> Self {
        let label = if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Self {
            polarity,
            subjectivity,
            label,
        }
    }

    /// Polarity on the 0–10 scale.
    pub fn score(&self) -> f64 {
        unit(self.polarity) * 10.0
    }
}

/// Mean of both methods on the 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FusedSentiment {
    pub score: f64,
    pub label: SentimentLabel,
}

impl FusedSentiment {
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 10.0);
        // 4 < score < 6 is Neutral; the band is not centered on 5
        let label = if score >= 6.0 {
            SentimentLabel::Positive
        } else if score <= 4.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Self { score, label }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentReport {
    pub valence: ValenceEstimate,
    pub polarity: PolarityEstimate,
    pub fused: FusedSentiment,
}

// (word, polarity, subjectivity)
const POLARITY_LEXICON: &[(&str, f64, f64)] = &[
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("wonderful", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("love", 0.5, 0.6),
    ("happy", 0.8, 1.0),
    ("nice", 0.6, 1.0),
    ("fun", 0.3, 0.2),
    ("cool", 0.35, 0.65),
    ("popular", 0.6, 0.9),
    ("exciting", 0.3, 0.8),
    ("beautiful", 0.85, 1.0),
    ("bad", -0.7, 0.67),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("hate", -0.8, 0.9),
    ("sad", -0.5, 1.0),
    ("boring", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("angry", -0.5, 1.0),
    ("disappointing", -0.6, 0.7),
    ("wrong", -0.5, 0.9),
    ("fake", -0.5, 1.0),
    ("scam", -0.8, 0.9),
    ("bagus", 0.7, 0.6),
    ("keren", 0.7, 0.8),
    ("mantap", 0.8, 0.8),
    ("hebat", 0.8, 0.7),
    ("senang", 0.8, 1.0),
    ("suka", 0.5, 0.6),
    ("seru", 0.6, 0.7),
    ("lucu", 0.5, 0.8),
    ("indah", 0.8, 0.9),
    ("populer", 0.6, 0.9),
    ("jelek", -0.7, 0.7),
    ("buruk", -0.7, 0.7),
    ("parah", -0.6, 0.8),
    ("sedih", -0.5, 1.0),
    ("kecewa", -0.6, 0.8),
    ("marah", -0.5, 1.0),
    ("benci", -0.8, 0.9),
    ("bosan", -0.5, 0.8),
    ("gagal", -0.5, 0.5),
    ("payah", -0.6, 0.8),
    ("hoax", -0.6, 0.8),
];

// modifiers placed before the word they strengthen
const PRE_INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("super", 1.4),
    ("so", 1.3),
    ("sangat", 1.3),
    ("amat", 1.3),
    ("paling", 1.4),
];

// Indonesian also intensifies after the word ("keren banget")
const POST_INTENSIFIERS: &[(&str, f64)] = &[("banget", 1.3), ("sekali", 1.3), ("bgt", 1.3)];

const NEGATORS: &[&str] = &[
    "not", "never", "no", "isnt", "dont", "tidak", "bukan", "nggak", "gak", "ga", "tak",
    "jangan", "kurang",
];

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn polarity_of(text: &str) -> PolarityEstimate {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut assessments: Vec<(f64, f64)> = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let Some(&(_, mut polarity, mut subjectivity)) =
            POLARITY_LEXICON.iter().find(|(w, _, _)| w == word)
        else {
            continue;
        };
        let before = &words[i.saturating_sub(2)..i];
        if let Some(factor) = i
            .checked_sub(1)
            .and_then(|p| lookup(PRE_INTENSIFIERS, words[p]))
        {
            polarity *= factor;
            subjectivity *= factor;
        }
        if let Some(factor) = words.get(i + 1).and_then(|n| lookup(POST_INTENSIFIERS, n)) {
            polarity *= factor;
            subjectivity *= factor;
        }
        if before.iter().any(|w| NEGATORS.contains(w)) {
            polarity *= -0.5;
        }
        assessments.push((polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)));
    }

    if assessments.is_empty() {
        return PolarityEstimate::default();
    }
    let n = assessments.len() as f64;
    let polarity = assessments.iter().map(|a| a.0).sum::<f64>() / n;
    let subjectivity = assessments.iter().map(|a| a.1).sum::<f64>() / n;
    PolarityEstimate::new(polarity, subjectivity)
}

fn valence_of(text: &str) -> ValenceEstimate {
    let analyzer = SentimentIntensityAnalyzer::new();
    let scores = analyzer.polarity_scores(text);
    let get = |k: &str| scores.get(k).copied().unwrap_or(0.0);
    ValenceEstimate::from_compound(get("compound"), get("pos"), get("neu"), get("neg"))
}

/// Runs `f`, replacing a panic with `T::default()`.
fn guarded<T: Default>(method: &str, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => v,
        Err(_) => {
            warn!("{method} sentiment failed; using neutral default");
            T::default()
        }
    }
}

///Scores already-normalized text with both methods and fuses them.
///Empty text gives neutral zero-confidence estimates and a fused score of 0.
pub fn estimate(normalized: &str) -> SentimentReport {
    if normalized.trim().is_empty() {
        return SentimentReport::default();
    }
    let valence = guarded("valence", || valence_of(normalized));
    let polarity = guarded("polarity", || polarity_of(normalized));
    let fused = FusedSentiment::from_score(
        ((unit(valence.compound) + unit(polarity.polarity)) / 2.0) * 10.0,
    );
    SentimentReport {
        valence,
        polarity,
        fused,
    }
}
