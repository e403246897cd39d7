use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AnalysisError, Result};
use crate::prompt::{DEFAULT_PROMPT_CHAR_BUDGET, MIN_PROMPT_CHAR_BUDGET};

pub const DEFAULT_MODEL_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL_NAME: &str = "gemma3:1b";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CSV_FILE: &str = "data_scraping.csv";

/// Settings injected into the engine and the CLI, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_endpoint: String,
    pub model_name: String,
    /// Upper bound for one model call.
    pub timeout: Duration,
    /// Characters of raw text embedded in each prompt.
    pub prompt_char_budget: usize,
    pub csv_path: PathBuf,
    /// Queries to run when none is given on the command line.
    pub keywords: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            csv_path: PathBuf::from(DEFAULT_CSV_FILE),
            keywords: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    ///Load settings through `lookup`, falling back to defaults for unset keys.
    ///Numeric values that do not parse are reported with the offending key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_ms = match get("TIMEOUT") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|e| AnalysisError::config("TIMEOUT", e.to_string()))?,
            None => DEFAULT_TIMEOUT_MS,
        };
        let prompt_char_budget = match get("PROMPT_CHAR_BUDGET") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|e| AnalysisError::config("PROMPT_CHAR_BUDGET", e.to_string()))?,
            None => DEFAULT_PROMPT_CHAR_BUDGET,
        };

        Ok(Self {
            model_endpoint: get("OLLAMA_BASE_URL").unwrap_or(defaults.model_endpoint),
            model_name: get("OLLAMA_MODEL").unwrap_or(defaults.model_name),
            timeout: Duration::from_millis(timeout_ms),
            prompt_char_budget: clamp_budget(prompt_char_budget),
            csv_path: get("CSV_FILENAME")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            keywords: get("TARGET_KEYWORDS")
                .map(|v| parse_keywords(&v))
                .unwrap_or_default(),
        })
    }
}

/// Keeps the prompt budget inside the supported 3000–3500 character window.
pub fn clamp_budget(budget: usize) -> usize {
    budget.clamp(MIN_PROMPT_CHAR_BUDGET, DEFAULT_PROMPT_CHAR_BUDGET)
}

/// Splits a comma-separated keyword list, dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let s = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_values_from_lookup() {
        let s = Settings::from_lookup(lookup_from(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "llama3"),
            ("TIMEOUT", "1500"),
            ("PROMPT_CHAR_BUDGET", "3200"),
            ("CSV_FILENAME", "out.csv"),
            ("TARGET_KEYWORDS", " pemilu , ,timnas,  "),
        ]))
        .unwrap();
        assert_eq!(s.model_endpoint, "http://gpu-box:11434");
        assert_eq!(s.model_name, "llama3");
        assert_eq!(s.timeout, Duration::from_millis(1500));
        assert_eq!(s.prompt_char_budget, 3200);
        assert_eq!(s.csv_path, PathBuf::from("out.csv"));
        assert_eq!(s.keywords, vec!["pemilu", "timnas"]);
    }

    #[test]
    fn test_budget_is_clamped() {
        let s = Settings::from_lookup(lookup_from(&[("PROMPT_CHAR_BUDGET", "100000")])).unwrap();
        assert_eq!(s.prompt_char_budget, 3500);
        assert_eq!(clamp_budget(10), 3000);
    }

    #[test]
    fn test_bad_number_names_key() {
        let err = Settings::from_lookup(lookup_from(&[("TIMEOUT", "soon")])).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { ref key, .. } if key == "TIMEOUT"));
    }
}
