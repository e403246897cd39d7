//! Frequency and corpus-relative keyword ranking.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tokenize::Tokenizer;

/// A term and how often it occurs in one token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    pub count: u32,
}

///Counts every token, keeping the order in which terms were first seen.
/// # Example
/// ```
/// use trend_analysis::count_terms;
/// let words = vec!["two".to_string(), "one".to_string(), "two".to_string()];
/// let counted = count_terms(&words);
/// assert_eq!(counted, vec![("two".to_string(), 2), ("one".to_string(), 1)]);
/// ```
pub fn count_terms(tokens: &[String]) -> Vec<(String, u32)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counted: Vec<(String, u32)> = Vec::new();
    for token in tokens {
        match index.get(token.as_str()) {
            Some(&i) => counted[i].1 += 1,
            None => {
                index.insert(token.as_str(), counted.len());
                counted.push((token.clone(), 1));
            }
        }
    }
    counted
}

///Top `n` terms by descending count. Ties keep first-occurrence order.
pub fn top_keywords(tokens: &[String], n: usize) -> Vec<KeywordEntry> {
    let mut counted = count_terms(tokens);
    // sort_by is stable, so equal counts stay in first-seen order
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted
        .into_iter()
        .take(n)
        .map(|(term, count)| KeywordEntry { term, count })
        .collect()
}

/// Unigrams followed by space-joined bigrams of one token stream.
fn terms_with_bigrams(tokens: &[String]) -> Vec<String> {
    let bigrams = tokens.windows(2).map(|w| format!("{} {}", w[0], w[1]));
    tokens.iter().cloned().chain(bigrams).collect()
}

///Ranks unigrams and bigrams across several documents by summed TF-IDF weight
///(smoothed idf, L2-normalized per document). Needs at least two documents;
///fewer yields an empty list.
pub fn corpus_keywords(documents: &[String], tokenizer: &Tokenizer, n: usize) -> Vec<String> {
    if documents.len() < 2 {
        return Vec::new();
    }

    let term_counts: Vec<Vec<(String, u32)>> = documents
        .par_iter()
        .map(|doc| count_terms(&terms_with_bigrams(&tokenizer.tokenize(doc))))
        .collect();

    let mut doc_freq: HashMap<&str, u32> = HashMap::new();
    for counts in &term_counts {
        for (term, _) in counts {
            *doc_freq.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let n_docs = documents.len() as f64;
    let idf = |term: &str| {
        let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
    };

    let mut scores: HashMap<&str, f64> = HashMap::new();
    for counts in &term_counts {
        let weights: Vec<(&str, f64)> = counts
            .iter()
            .map(|(term, tf)| (term.as_str(), *tf as f64 * idf(term)))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        for (term, w) in weights {
            *scores.entry(term).or_insert(0.0) += w / norm;
        }
    }

    let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(term, _)| term.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{Lexicon, SuffixFamily};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_top_keywords_ranking_and_ties() {
        let tokens = words(&["beta", "alpha", "beta", "gamma", "alpha", "delta", "beta"]);
        let top = top_keywords(&tokens, 3);
        assert_eq!(
            top,
            vec![
                KeywordEntry { term: "beta".into(), count: 3 },
                KeywordEntry { term: "alpha".into(), count: 2 },
                KeywordEntry { term: "gamma".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_top_keywords_short_and_empty() {
        assert!(top_keywords(&[], 5).is_empty());
        let tokens = words(&["solo"]);
        assert_eq!(top_keywords(&tokens, 5).len(), 1);
    }

    #[test]
    fn test_corpus_keywords_needs_two_documents() {
        let lexicon = Lexicon::default();
        let tokenizer = Tokenizer::new(&lexicon);
        assert!(corpus_keywords(&[], &tokenizer, 10).is_empty());
        assert!(corpus_keywords(&["konser musik".to_string()], &tokenizer, 10).is_empty());
    }

    #[test]
    fn test_corpus_keywords_ranks_unigrams_and_bigrams() {
        let lexicon = Lexicon::default();
        let tokenizer = Tokenizer::new(&lexicon).with_family(SuffixFamily::Indonesian);
        let docs = vec![
            "konser musik konser musik konser".to_string(),
            "konser festival".to_string(),
            "konser pantai".to_string(),
        ];
        let ranked = corpus_keywords(&docs, &tokenizer, 4);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0], "konser");
        assert!(ranked.iter().any(|t| t.contains(' ')), "bigram expected in {ranked:?}");
    }
}
