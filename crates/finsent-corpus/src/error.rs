//! Error types for corpus operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Errors that can occur while building or reading a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown sentiment label
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Unknown example source
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Required input file or directory is missing
    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),
}
