//! Flat CSV rows, one per analyzed document.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::fusion::AnalysisResult;
use crate::source::Platform;

/// Placeholder for values the engine did not produce.
pub const MISSING: &str = "N/A";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted analysis. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub timestamp: String,
    pub platform: String,
    pub keyword: String,
    pub score: String,
    pub category: String,
    pub trend_strength: String,
    pub nlp_sentiment: String,
    pub nlp_score: String,
    pub top_keywords: String,
    pub summary: String,
}

impl TrendRow {
    /// Flattens a result; `timestamp` stays `N/A` until the row is written.
    pub fn from_result(platform: Platform, keyword: &str, result: &AnalysisResult) -> Self {
        let nlp = result.nlp_analysis.as_ref();
        Self {
            timestamp: MISSING.to_string(),
            platform: platform.to_string(),
            keyword: keyword.to_string(),
            score: result.score.to_string(),
            category: result.category.to_string(),
            trend_strength: result.trend_strength.to_string(),
            nlp_sentiment: nlp.map_or_else(|| MISSING.to_string(), |n| n.sentiment_label.to_string()),
            nlp_score: nlp.map_or_else(|| MISSING.to_string(), |n| format!("{}", n.sentiment_score)),
            top_keywords: nlp
                .filter(|n| !n.top_keywords.is_empty())
                .map_or_else(|| MISSING.to_string(), |n| n.top_keywords.join(", ")),
            summary: or_missing(&result.summary),
        }
    }

    fn sanitized(&self) -> Self {
        Self {
            timestamp: self.timestamp.clone(),
            platform: csv_safe_cell(self.platform.clone()),
            keyword: csv_safe_cell(self.keyword.clone()),
            score: self.score.clone(),
            category: self.category.clone(),
            trend_strength: self.trend_strength.clone(),
            nlp_sentiment: self.nlp_sentiment.clone(),
            nlp_score: self.nlp_score.clone(),
            top_keywords: csv_safe_cell(self.top_keywords.clone()),
            summary: csv_safe_cell(self.summary.clone()),
        }
    }
}

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

///Neutralizes cells a spreadsheet would read as a formula by prefixing `'`.
/// # Example
/// ```
/// use trend_analysis::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=SUM(A1)".to_string()), "'=SUM(A1)");
/// assert_eq!(csv_safe_cell("konser".to_string()), "konser");
/// ```
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Appends rows to a CSV file, creating it with a header on first use.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    ///Stamps `row` with the current local time and appends it.
    pub fn append(&self, row: &mut TrendRow) -> Result<()> {
        self.append_all(std::slice::from_mut(row))
    }

    ///Stamps and appends several rows under one file handle.
    pub fn append_all(&self, rows: &mut [TrendRow]) -> Result<()> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(is_new).from_writer(file);

        let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
        for row in rows.iter_mut() {
            row.timestamp = now.clone();
            writer.serialize(row.sanitized())?;
        }
        writer.flush()?;
        info!("Saved {} row(s) to {}", rows.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::NlpSummary;
    use crate::response::{Category, TrendStrength};
    use crate::sentiment::SentimentLabel;
    use crate::engagement::EngagementSummary;
    use std::fs;

    fn result(nlp: bool) -> AnalysisResult {
        AnalysisResult {
            summary: "=cmd|' /C calc'!A0".into(),
            score: 7,
            category: Category::SocialIssue,
            trend_strength: TrendStrength::Stable,
            nlp_analysis: nlp.then(|| NlpSummary {
                sentiment_label: SentimentLabel::Negative,
                sentiment_score: 3.25,
                top_keywords: vec!["banjir".into(), "jakarta".into()],
                engagement: EngagementSummary::default(),
                lexical_diversity: 0.8,
            }),
            score_adjusted: false,
        }
    }

    #[test]
    fn test_row_without_statistics_uses_placeholder() {
        let row = TrendRow::from_result(Platform::Twitter, "banjir", &result(false));
        assert_eq!(row.nlp_sentiment, "N/A");
        assert_eq!(row.nlp_score, "N/A");
        assert_eq!(row.top_keywords, "N/A");
        assert_eq!(row.category, "Social Issue");
        assert_eq!(row.platform, "twitter");
    }

    #[test]
    fn test_row_with_statistics() {
        let row = TrendRow::from_result(Platform::Tiktok, "banjir", &result(true));
        assert_eq!(row.nlp_sentiment, "Negative");
        assert_eq!(row.nlp_score, "3.25");
        assert_eq!(row.top_keywords, "banjir, jakarta");
    }

    #[test]
    fn test_csv_safe_cell() {
        assert_eq!(csv_safe_cell("+1".into()), "'+1");
        assert_eq!(csv_safe_cell("@x".into()), "'@x");
        assert_eq!(csv_safe_cell("'=already".into()), "'=already");
        assert_eq!(csv_safe_cell(String::new()), "");
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("out.csv"));
        let mut first = TrendRow::from_result(Platform::Google, "a", &result(true));
        let mut second = TrendRow::from_result(Platform::Google, "b", &result(false));
        store.append(&mut first).unwrap();
        store.append(&mut second).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,platform,keyword,score,category,trend_strength,nlp_sentiment,nlp_score,top_keywords,summary"
        );
        assert_eq!(lines.len(), 3);
        assert_ne!(first.timestamp, "N/A");
        assert_eq!(first.timestamp.len(), 19);

        let mut reader = csv::Reader::from_path(store.path()).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0][9].starts_with("'="));
        assert_eq!(&records[1][6], "N/A");
    }
}
