use std::fmt::Write;

use crate::response::{Category, TrendStrength};
use crate::stats::StatisticalAnalysis;

/// Default number of raw-text characters embedded in a prompt.
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 3500;
pub const MIN_PROMPT_CHAR_BUDGET: usize = 3000;

///First `max_chars` characters of `text`, cut on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn choices<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    let labels: Vec<String> = items.into_iter().map(|c| c.to_string()).collect();
    match labels.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

///Builds the instruction sent to the generative model for one document.
///Statistical results, when present, are added as hints only; the JSON output
///directive always comes after them.
pub fn build_prompt(
    text: &str,
    query: &str,
    stats: Option<&StatisticalAnalysis>,
    char_budget: usize,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are an expert digital trend analyst. Analyze the following data collected from a search for \"{query}\"."
    );
    prompt.push_str("\nINSTRUCTIONS:\n");
    prompt.push_str("1. Write a short, informative summary (at most 3 sentences).\n");
    prompt.push_str("2. Give a popularity score from 1 to 10 based on:\n");
    prompt.push_str("   - content volume / engagement\n");
    prompt.push_str("   - public sentiment\n");
    prompt.push_str("   - trending indicators\n");
    let _ = writeln!(
        prompt,
        "3. Choose the trend category: {}.",
        choices(Category::CHOICES)
    );
    let _ = writeln!(
        prompt,
        "4. Choose the trend strength: {}.",
        choices(TrendStrength::CHOICES)
    );

    if let Some(stats) = stats {
        prompt.push_str("\nNLP ANALYSIS CONTEXT (advisory only):\n");
        let _ = writeln!(
            prompt,
            "- Sentiment: {} ({:.2}/10)",
            stats.sentiment.fused.label,
            stats.score()
        );
        let _ = writeln!(prompt, "- Top Keywords: {}", stats.top_terms(5).join(", "));
        let _ = writeln!(
            prompt,
            "- Engagement Metrics: {}",
            stats.engagement.average
        );
    }

    prompt.push_str("\nOUTPUT FORMAT (JSON ONLY, no other text):\n");
    prompt.push_str(
        "{\n    \"summary\": \"Your summary...\",\n    \"score\": 8,\n    \"category\": \"Entertainment\",\n    \"trend_strength\": \"Viral\"\n}\n",
    );
    prompt.push_str("\nRAW DATA:\n");
    prompt.push_str(truncate_chars(text, char_budget));
    prompt.push('\n');
    prompt
}
