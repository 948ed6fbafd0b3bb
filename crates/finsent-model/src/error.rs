//! Error types for model operations.

use finsent_corpus::CorpusError;
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while training, saving or loading a classifier.
#[derive(Debug, Error)]
pub enum ModelError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Corpus error
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Invalid training arguments or base model
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Nothing to train or evaluate on
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Malformed checkpoint
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}
