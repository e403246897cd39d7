//! Error taxonomy for the trend analysis pipeline.
//!
//! Only the ambient layers (configuration, file sources, CSV storage) let these
//! errors escape to the caller. Inside the per-document pipeline every variant
//! is recoverable and is turned into default values plus a log line.

use std::time::Duration;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input was empty after normalization.
    #[error("empty input")]
    EmptyInput,

    /// The generative model could not be reached or refused the request.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The generative model did not answer within the configured timeout.
    #[error("model timed out after {0:?}")]
    ModelTimeout(Duration),

    /// The model answered, but nothing structured could be read from it.
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    /// The lexicon-based branch failed for this document.
    #[error("statistical pipeline failure: {0}")]
    StatisticalPipelineFailure(String),

    #[error("invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for the failures the engine absorbs into default values.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::ModelUnavailable(_)
                | Self::ModelTimeout(_)
                | Self::MalformedModelOutput(_)
                | Self::StatisticalPipelineFailure(_)
        )
    }
}
