//! Tokenizer and heuristic suffix stemmer for Indonesian and English text.
//!
//! The stopword and suffix tables live in a [`Lexicon`] that is built once at
//! startup and handed to a [`Tokenizer`] by reference. Nothing here mutates it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use whatlang::{Lang, detect};

use crate::error::Result;
use crate::preprocess::normalize;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z0-9\u{DF}-\u{F6}\u{F8}-\u{FF}]+").expect("valid token regex")
});

const STOPWORDS_ID: &[&str] = &[
    "yang", "untuk", "pada", "adalah", "ini", "itu", "dengan", "dari", "di", "dan", "atau",
    "dalam", "juga", "bisa", "ada", "akan", "dia", "kamu", "kita", "mereka", "saya", "tak",
    "tidak", "ya", "telah", "waktu", "orang", "saat", "nama", "hari", "baru", "lagi", "tahun",
    "bulan", "minggu", "jam", "menit", "detik", "sebagai", "oleh", "karena", "jika", "ke",
    "para", "amat", "agar", "ataupun", "bahwa", "demi", "hingga", "jangan", "melainkan",
    "memang", "mengingat", "meski", "mungkin", "nantinya", "pula", "sambil", "sampai", "saja",
    "saling", "sangat", "sebab", "sebelum", "sebuah", "secara", "sedang", "segera", "sehingga",
    "sejak", "sekali", "sekaligus", "selama", "selanjutnya", "semua", "semula", "sendiri",
    "seolah", "seorang", "seperti", "seraya", "sering", "serta", "sesuatu", "sesungguhnya",
    "setelah", "setiap", "seusai", "suatu", "sudah", "supaya", "tadi", "tahu", "tapi", "tepat",
    "terhadap", "terus", "tetap", "tetapi", "tiap", "tidaklah", "tinggal", "tuju", "ujar",
    "umumnya", "usah", "usai", "waduh", "wah", "walau", "wong",
];

const STOPWORDS_EN: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "this", "that", "these",
    "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
    "my", "your", "his", "its", "our", "their", "mine", "yours", "hers", "ours", "theirs",
    "what", "which", "who", "whom", "whose", "where", "when", "why", "how", "all", "any",
    "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "just", "now",
];

const SUFFIXES_ID: &[&str] = &["nya", "lah", "kah", "pun", "ku", "mu"];
const SUFFIXES_EN: &[&str] = &["ing", "ed", "es", "s", "ly"];
const SUFFIXES_MIXED: &[&str] = &[
    "nya", "lah", "kah", "pun", "ku", "mu", "ing", "ed", "es", "s", "ly",
];

/// Which ordered suffix list the stemmer applies to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixFamily {
    Indonesian,
    English,
    /// Indonesian suffixes first, then English ones. Used when detection is unsure.
    Mixed,
}

impl SuffixFamily {
    /// Picks the family from the document language, falling back to `Mixed`.
    pub fn detect(text: &str) -> Self {
        match detect(text) {
            Some(info) if info.is_reliable() => match info.lang() {
                Lang::Ind => SuffixFamily::Indonesian,
                Lang::Eng => SuffixFamily::English,
                _ => SuffixFamily::Mixed,
            },
            _ => SuffixFamily::Mixed,
        }
    }
}

/// Immutable stopword and suffix tables shared by every analysis.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let stopwords = STOPWORDS_ID
            .iter()
            .chain(STOPWORDS_EN)
            .map(|w| w.to_string())
            .collect();
        Self { stopwords }
    }
}

impl Lexicon {
    /// Built-in bilingual tables, extended with an optional stopword file
    /// (one word per line, `#` starts a comment line).
    pub fn load(extra_stopwords: Option<&Path>) -> Result<Self> {
        let mut lexicon = Self::default();
        if let Some(path) = extra_stopwords {
            let content = fs::read_to_string(path)?;
            let before = lexicon.stopwords.len();
            lexicon.stopwords.extend(
                content
                    .lines()
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty() && !l.starts_with('#')),
            );
            debug!(
                "Loaded {} extra stopwords from {}",
                lexicon.stopwords.len() - before,
                path.display()
            );
        }
        Ok(lexicon)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    pub fn suffixes(&self, family: SuffixFamily) -> &'static [&'static str] {
        match family {
            SuffixFamily::Indonesian => SUFFIXES_ID,
            SuffixFamily::English => SUFFIXES_EN,
            SuffixFamily::Mixed => SUFFIXES_MIXED,
        }
    }
}

///Removes the first suffix from `suffixes` that `word` ends with, as long as the word
///is longer than `suffix + 2` characters. At most one suffix is removed, so the stem
///always keeps at least three characters.
/// # Example
/// ```
/// use trend_analysis::strip_suffix;
/// assert_eq!(strip_suffix("bukunya", &["nya", "ku"]), "buku");
/// assert_eq!(strip_suffix("kuku", &["ku"]), "kuku");
/// ```
pub fn strip_suffix(word: &str, suffixes: &[&str]) -> String {
    let len = word.chars().count();
    for suffix in suffixes {
        let suffix_len = suffix.chars().count();
        if word.ends_with(suffix) && len > suffix_len + 2 {
            return word[..word.len() - suffix.len()].to_string();
        }
    }
    word.to_string()
}

/// Splits text into filtered, stemmed tokens.
pub struct Tokenizer<'a> {
    lexicon: &'a Lexicon,
    family: Option<SuffixFamily>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            family: None,
        }
    }

    /// Forces one suffix family instead of detecting it per document.
    pub fn with_family(mut self, family: SuffixFamily) -> Self {
        self.family = Some(family);
        self
    }

    ///Normalizes `text` and returns its tokens in order, duplicates kept.
    ///Stopwords and tokens shorter than two characters are dropped; the rest are stemmed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let clean = normalize(text);
        if clean.is_empty() {
            return Vec::new();
        }
        let family = self
            .family
            .unwrap_or_else(|| SuffixFamily::detect(&clean));
        let suffixes = self.lexicon.suffixes(family);
        TOKEN
            .find_iter(&clean)
            .map(|m| m.as_str())
            .filter(|w| w.chars().count() >= 2 && !self.lexicon.is_stopword(w))
            .map(|w| strip_suffix(w, suffixes))
            .filter(|stem| !self.lexicon.is_stopword(stem))
            .collect()
    }
}

///Ratio of unique tokens to all tokens, 0 for an empty stream.
pub fn lexical_diversity(tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = tokens.iter().collect();
    unique.len() as f64 / tokens.len() as f64
}
