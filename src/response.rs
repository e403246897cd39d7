//! Recovery of the model's structured verdict from free text.
//!
//! Models asked for "JSON only" still wrap it in code fences, prepend chatter,
//! or emit something JSON-shaped that does not parse. [`parse`] tries, in
//! order: strict JSON, the longest flat `{...}` substring, then per-field
//! patterns. Whatever is missing falls back to the defaults of
//! [`ModelRecord::default`].

use std::fmt;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AnalysisError, Result};

pub const DEFAULT_SUMMARY: &str = "Analysis completed";
pub const DEFAULT_SCORE: u8 = 5;

// An opening fence may carry a language tag and ends its line; a closing fence is bare.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*\r?\n|^[ \t]*```[ \t]*\r?$")
        .expect("valid fence regex")
});
static FLAT_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^{}]*"[^"]*"[^{}]*\}"#).expect("valid object regex"));
static SUMMARY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid field regex")
});
static SCORE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""score"\s*:\s*"?(\d+)"#).expect("valid field regex"));
static CATEGORY_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""category"\s*:\s*"([^"]+)""#).expect("valid field regex"));
static TREND_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""trend_strength"\s*:\s*"([^"]+)""#).expect("valid field regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    Entertainment,
    Business,
    Technology,
    #[serde(rename = "Social Issue")]
    SocialIssue,
    Sports,
    Other,
    #[default]
    Unknown,
}

impl Category {
    pub const CHOICES: [Category; 6] = [
        Category::Entertainment,
        Category::Business,
        Category::Technology,
        Category::SocialIssue,
        Category::Sports,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Business => "Business",
            Category::Technology => "Technology",
            Category::SocialIssue => "Social Issue",
            Category::Sports => "Sports",
            Category::Other => "Other",
            Category::Unknown => "Unknown",
        }
    }

    /// Case-insensitive; a label outside the closed set becomes `Other`.
    pub fn from_label(label: &str) -> Self {
        let wanted: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if wanted.is_empty() {
            return Category::Unknown;
        }
        Category::CHOICES
            .into_iter()
            .chain([Category::Unknown])
            .find(|c| c.as_str().replace(' ', "").to_lowercase() == wanted)
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrendStrength {
    Viral,
    Rising,
    Stable,
    Declining,
    #[default]
    Medium,
}

impl TrendStrength {
    pub const CHOICES: [TrendStrength; 4] = [
        TrendStrength::Viral,
        TrendStrength::Rising,
        TrendStrength::Stable,
        TrendStrength::Declining,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStrength::Viral => "Viral",
            TrendStrength::Rising => "Rising",
            TrendStrength::Stable => "Stable",
            TrendStrength::Declining => "Declining",
            TrendStrength::Medium => "Medium",
        }
    }

    /// Case-insensitive; anything unrecognized becomes `Medium`.
    pub fn from_label(label: &str) -> Self {
        let wanted = label.trim().to_lowercase();
        TrendStrength::CHOICES
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == wanted)
            .unwrap_or(TrendStrength::Medium)
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured judgement requested from the generative model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub summary: String,
    /// Always within 1..=10.
    pub score: u8,
    pub category: Category,
    pub trend_strength: TrendStrength,
}

impl Default for ModelRecord {
    fn default() -> Self {
        Self {
            summary: DEFAULT_SUMMARY.to_string(),
            score: DEFAULT_SCORE,
            category: Category::Unknown,
            trend_strength: TrendStrength::Medium,
        }
    }
}

impl ModelRecord {
    /// Default record whose summary carries the reason the model gave nothing usable.
    pub fn fallback(err: &AnalysisError) -> Self {
        Self {
            summary: format!("{DEFAULT_SUMMARY} [model error: {err}]"),
            ..Self::default()
        }
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return DEFAULT_SCORE;
    }
    raw.round_ties_even().clamp(1.0, 10.0) as u8
}

fn score_from_value(v: &Value) -> Option<u8> {
    match v {
        Value::Number(n) => n.as_f64().map(clamp_score),
        Value::String(s) => s.trim().parse::<f64>().ok().map(clamp_score),
        _ => None,
    }
}

/// Fills a record from a parsed JSON object, defaulting absent or mistyped fields.
fn record_from_object(obj: &Map<String, Value>) -> ModelRecord {
    let defaults = ModelRecord::default();
    ModelRecord {
        summary: obj
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or(defaults.summary),
        score: obj
            .get("score")
            .and_then(score_from_value)
            .unwrap_or(defaults.score),
        category: obj
            .get("category")
            .and_then(Value::as_str)
            .map(Category::from_label)
            .unwrap_or(defaults.category),
        trend_strength: obj
            .get("trend_strength")
            .and_then(Value::as_str)
            .map(TrendStrength::from_label)
            .unwrap_or(defaults.trend_strength),
    }
}

///Removes code-fence markers (with an optional language tag) and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "").trim().to_string()
}

fn parse_strict(text: &str) -> Result<ModelRecord> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Ok(record_from_object(&obj)),
        Ok(other) => Err(AnalysisError::MalformedModelOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AnalysisError::MalformedModelOutput(e.to_string())),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_loose_object(text: &str) -> Result<ModelRecord> {
    let best = FLAT_OBJECT
        .find_iter(text)
        .map(|m| m.as_str())
        .max_by_key(|m| m.len())
        .ok_or_else(|| AnalysisError::MalformedModelOutput("no object-shaped substring".into()))?;
    parse_strict(best)
}

/// Undoes JSON string escapes in a value captured by pattern.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_fields(text: &str) -> ModelRecord {
    let capture = |re: &Regex| re.captures(text).map(|c| c[1].to_string());
    let defaults = ModelRecord::default();
    ModelRecord {
        summary: capture(&SUMMARY_FIELD)
            .map(|s| unescape(&s).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.summary),
        score: capture(&SCORE_FIELD)
            .and_then(|s| s.parse::<f64>().ok())
            .map(clamp_score)
            .unwrap_or(defaults.score),
        category: capture(&CATEGORY_FIELD)
            .map(|c| Category::from_label(&c))
            .unwrap_or(defaults.category),
        trend_strength: capture(&TREND_FIELD)
            .map(|t| TrendStrength::from_label(&t))
            .unwrap_or(defaults.trend_strength),
    }
}

///Reads a [`ModelRecord`] from a model reply. Never fails: anything that cannot be
///recovered is defaulted.
/// # Example
/// ```
/// use trend_analysis::{Category, TrendStrength, parse};
/// let r = parse("```json\n{\"summary\":\"ok\",\"score\":8,\"category\":\"Entertainment\",\"trend_strength\":\"Viral\"}\n```");
/// assert_eq!(r.score, 8);
/// assert_eq!(r.category, Category::Entertainment);
/// assert_eq!(r.trend_strength, TrendStrength::Viral);
/// ```
pub fn parse(raw_reply: &str) -> ModelRecord {
    let cleaned = strip_code_fences(raw_reply);
    match parse_strict(&cleaned) {
        Ok(record) => record,
        Err(strict_err) => {
            debug!("Strict parse failed: {strict_err}");
            match parse_loose_object(&cleaned) {
                Ok(record) => record,
                Err(loose_err) => {
                    warn!("Model reply is not JSON ({loose_err}); extracting fields by pattern");
                    parse_fields(&cleaned)
                }
            }
        }
    }
}
