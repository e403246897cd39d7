#![forbid(unsafe_code)]
//! # Trend Analysis CLI
//!
//! Command-line front end for the `trend_analysis` crate. Reads pre-scraped
//! `.txt` dumps, scores each one with the statistical branch and the configured
//! model, appends one CSV row per result and prints a report.
//!
//! ## Example
//! ```bash
//! cargo run --release -- dumps/ --keyword "konser" --export-format json
//! ```
//!
//! Configuration comes from the environment (or a `.env` file); see `--help`
//! for the flags that override it.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use trend_analysis::{
    CsvStore, DisabledModel, DumpFile, ModelClient, OllamaClient, Platform, RawDocument,
    Settings, StatisticalAnalyzer, TextSource, TrendEngine, TrendReport, TrendRow, collect_files,
    config::clamp_budget, render, render_summary,
};

const CORPUS_KEYWORD_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Txt,
    Json,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Text dump or directory of dumps (.txt)
    path: String,

    /// Query the dumps were scraped for (default: TARGET_KEYWORDS, else the file name)
    #[arg(long)]
    keyword: Option<String>,

    /// Platform of every dump (default: prefix of each file name, e.g. tiktok_konser.txt)
    #[arg(long)]
    platform: Option<String>,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<String>,

    /// CSV file results are appended to (default: CSV_FILENAME)
    #[arg(long)]
    csv: Option<String>,

    /// Output format for the report (txt, json)
    #[arg(long, value_enum, default_value_t = ExportFormat::Txt)]
    export_format: ExportFormat,

    /// Skip the generative model and rely on the statistical branch only
    #[arg(long, default_value_t = false)]
    no_model: bool,

    /// Model name (default: OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Model server base URL (default: OLLAMA_BASE_URL)
    #[arg(long)]
    model_url: Option<String>,

    /// Model call timeout in milliseconds (default: TIMEOUT)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Raw-text characters sent to the model, 3000–3500 (default: PROMPT_CHAR_BUDGET)
    #[arg(long)]
    prompt_budget: Option<usize>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model_name = model.clone();
        }
        if let Some(url) = &self.model_url {
            settings.model_endpoint = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            settings.timeout = std::time::Duration::from_millis(ms);
        }
        if let Some(budget) = self.prompt_budget {
            settings.prompt_char_budget = clamp_budget(budget);
        }
        if let Some(csv) = &self.csv {
            settings.csv_path = PathBuf::from(csv);
        }
        if let Some(keyword) = &self.keyword {
            settings.keywords = vec![keyword.clone()];
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    results: &'a [TrendReport],
    corpus_keywords: &'a [String],
    failed_files: &'a [(String, String)],
}

/// Outcome of one dump file.
struct FileOutcome {
    text: String,
    reports: Vec<TrendReport>,
    blocked: bool,
}

fn build_client(settings: &Settings, disabled: bool) -> Box<dyn ModelClient> {
    if disabled {
        info!("Model disabled, statistical branch only");
        return Box::new(DisabledModel);
    }
    match OllamaClient::new(settings) {
        Ok(client) => {
            info!("Using model {} at {}", settings.model_name, settings.model_endpoint);
            Box::new(client)
        }
        Err(e) => {
            warn!("Model client unavailable ({e}); continuing without it");
            Box::new(DisabledModel)
        }
    }
}

fn resolve_platform(flag: Option<&str>, file: &Path) -> Result<Platform, String> {
    match flag {
        Some(name) => Platform::from_name(name).map_err(|e| e.to_string()),
        None => Platform::from_file_name(file)
            .ok_or_else(|| "cannot tell the platform from the file name; use --platform".to_string()),
    }
}

fn analyze_file<C: ModelClient>(
    engine: &TrendEngine<C>,
    file: &Path,
    platform: Platform,
) -> Result<FileOutcome, String> {
    let source = DumpFile::new(platform, file);
    let queries: Vec<String> = if engine.settings().keywords.is_empty() {
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        vec![stem]
    } else {
        engine.settings().keywords.clone()
    };

    let mut outcome = FileOutcome {
        text: String::new(),
        reports: Vec::new(),
        blocked: false,
    };
    for query in queries {
        let text = source.fetch(&query).map_err(|e| e.to_string())?;
        match engine.analyze(&RawDocument::new(text.clone(), query.clone())) {
            Some(result) => outcome.reports.push(TrendReport {
                platform,
                keyword: query,
                source: file.display().to_string(),
                result,
            }),
            None => outcome.blocked = true,
        }
        outcome.text = text;
    }
    Ok(outcome)
}

fn print_failed_files(failed: &[(String, String)]) {
    eprintln!("\nWarning: The following files could not be analyzed:");
    for (file, reason) in failed {
        eprintln!("  {file}: {reason}");
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error: {e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    cli.apply(&mut settings);

    let path = Path::new(&cli.path);
    if !path.exists() {
        error!("Path does not exist: {}", cli.path);
        eprintln!("Error: path does not exist: {}", cli.path);
        process::exit(1);
    }
    let files = collect_files(path);
    if files.is_empty() {
        eprintln!("Error: no .txt files found in {}", cli.path);
        process::exit(1);
    }

    let statistical = StatisticalAnalyzer::try_init(cli.stopwords.as_deref().map(Path::new));
    let client = build_client(&settings, cli.no_model);
    let store = CsvStore::new(settings.csv_path.clone());
    let engine = TrendEngine::new(settings, client, statistical);

    let outcomes: Vec<(PathBuf, Result<FileOutcome, String>)> = files
        .par_iter()
        .map(|file| {
            let outcome = resolve_platform(cli.platform.as_deref(), file)
                .and_then(|platform| analyze_file(&engine, file, platform));
            (file.clone(), outcome)
        })
        .collect();

    let mut reports: Vec<TrendReport> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    let mut failed: Vec<(String, String)> = Vec::new();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(outcome) => {
                if outcome.blocked {
                    warn!("{}: source reported a bot block, no result recorded", file.display());
                }
                if !outcome.reports.is_empty() {
                    texts.push(outcome.text);
                }
                reports.extend(outcome.reports);
            }
            Err(reason) => {
                error!("Error analyzing {}: {reason}", file.display());
                failed.push((file.display().to_string(), reason));
            }
        }
    }

    let mut rows: Vec<TrendRow> = reports
        .iter()
        .map(|r| TrendRow::from_result(r.platform, &r.keyword, &r.result))
        .collect();
    if !rows.is_empty() {
        if let Err(e) = store.append_all(&mut rows) {
            error!("Could not write {}: {e}", store.path().display());
            failed.push((store.path().display().to_string(), e.to_string()));
        }
    }

    let corpus = engine.corpus_keywords(&texts, CORPUS_KEYWORD_LIMIT);
    match cli.export_format {
        ExportFormat::Json => {
            let export = JsonExport {
                results: &reports,
                corpus_keywords: &corpus,
                failed_files: &failed,
            };
            match serde_json::to_string_pretty(&export) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("Error: {e}");
                    process::exit(1);
                }
            }
        }
        ExportFormat::Txt => {
            for r in &reports {
                println!("{}", render(r.platform, &r.keyword, &r.result));
            }
            if reports.len() > 1 {
                println!("{}", render_summary(&reports));
            }
            if !corpus.is_empty() {
                println!("Corpus Keywords: {}", corpus.join(", "));
            }
        }
    }

    if !failed.is_empty() {
        print_failed_files(&failed);
        process::exit(1);
    }
}
