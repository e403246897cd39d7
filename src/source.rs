//! Boundary to the scraping side. Live page scraping is not part of this crate;
//! a [`TextSource`] just hands over the raw text gathered for a query.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{AnalysisError, Result};

/// Marker a scraper puts in its output when the platform blocked automated access.
pub const BLOCKED_MARKER: &str = "TERDETEKSI BOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Tiktok,
    Instagram,
    Youtube,
    Twitter,
    Facebook,
    Threads,
}

const PLATFORMS: &[(&str, Platform)] = &[
    ("google", Platform::Google),
    ("tiktok", Platform::Tiktok),
    ("instagram", Platform::Instagram),
    ("youtube", Platform::Youtube),
    ("twitter", Platform::Twitter),
    ("x", Platform::Twitter),
    ("facebook", Platform::Facebook),
    ("threads", Platform::Threads),
];

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Tiktok,
        Platform::Youtube,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Google,
        Platform::Threads,
        Platform::Facebook,
    ];

    /// Case-insensitive lookup; `x` is an alias for Twitter.
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim().to_lowercase();
        PLATFORMS
            .iter()
            .find(|(n, _)| *n == wanted)
            .map(|(_, p)| *p)
            .ok_or_else(|| AnalysisError::UnknownPlatform(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Threads => "threads",
        }
    }

    ///Platform named by the start of a file stem: `tiktok.txt`, `tiktok_konser.txt`
    ///and `youtube-2024.txt` all resolve.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let prefix = stem.split(['_', '-', '.', ' ']).next()?;
        Self::from_name(prefix).ok()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can produce raw text for a query on one platform.
pub trait TextSource {
    fn platform(&self) -> Platform;
    fn fetch(&self, query: &str) -> Result<String>;
}

/// Text scraped earlier and saved to disk.
#[derive(Debug, Clone)]
pub struct DumpFile {
    platform: Platform,
    path: PathBuf,
}

impl DumpFile {
    pub fn new(platform: Platform, path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for DumpFile {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn fetch(&self, _query: &str) -> Result<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// True when scraped text says the platform blocked the scraper.
pub fn is_blocked(text: &str) -> bool {
    text.contains(BLOCKED_MARKER)
}

///All `.txt` files under `path` (or `path` itself when it is a `.txt` file),
///sorted so runs are reproducible.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    let is_txt = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
    };
    if path.is_file() {
        return if is_txt(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        };
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_txt(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
