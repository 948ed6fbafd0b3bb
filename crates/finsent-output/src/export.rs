//! Dataset export.
//!
//! A prepared dataset is written three ways: a flat CSV for training, a JSON
//! array of records, and a small metadata document.

use chrono::{DateTime, SecondsFormat, Utc};
use finsent_corpus::{DATASET_VERSION, Dataset, DatasetMetadata, Label, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CSV file name of a prepared dataset.
pub const TRAINING_DATA_CSV: &str = "training_data.csv";

/// JSON file name of a prepared dataset.
pub const TRAINING_DATA_JSON: &str = "training_data.json";

/// Metadata file name of a prepared dataset.
pub const DATASET_METADATA_JSON: &str = "dataset_metadata.json";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Pretty-printed JSON format.
    PrettyJson,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// One exported training example.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
    /// Cleaned text.
    pub text: String,

    /// Sentiment label.
    pub label: Label,

    /// Originating source.
    pub source: Source,

    /// Source specific details.
    pub metadata: BTreeMap<String, Value>,

    /// Export timestamp (RFC 3339).
    pub created_at: String,

    /// Dataset format version.
    pub dataset_version: String,
}

/// CSV row: metadata is flattened to a JSON string.
#[derive(Debug, Serialize)]
struct TrainingRecordFlat<'a> {
    text: &'a str,
    label: Label,
    source: Source,
    metadata: String,
    created_at: &'a str,
    dataset_version: &'a str,
}

/// A dataset stamped with its export time.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetExport {
    /// Rows in dataset order.
    pub records: Vec<TrainingRecord>,

    /// Summary written as `dataset_metadata.json`.
    pub metadata: DatasetMetadata,
}

impl DatasetExport {
    /// Stamp every example of `dataset` with `created_at`.
    pub fn new(dataset: &Dataset, created_at: DateTime<Utc>) -> Self {
        let created_at = created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let records = dataset
            .examples()
            .iter()
            .map(|e| TrainingRecord {
                text: e.text.clone(),
                label: e.label,
                source: e.source,
                metadata: e.metadata.clone(),
                created_at: created_at.clone(),
                dataset_version: DATASET_VERSION.to_string(),
            })
            .collect();
        Self {
            records,
            metadata: DatasetMetadata::describe(dataset, &created_at),
        }
    }

    /// Write the CSV, JSON and metadata files into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<DatasetFiles, ExportError> {
        fs::create_dir_all(dir)?;
        let files = DatasetFiles::in_dir(dir);
        self.export_to_file(&files.csv, ExportFormat::Csv)?;
        self.export_to_file(&files.json, ExportFormat::PrettyJson)?;
        fs::write(&files.metadata, serde_json::to_string_pretty(&self.metadata)?)?;
        tracing::info!(
            rows = self.records.len(),
            dir = %dir.display(),
            "saved training data"
        );
        Ok(files)
    }
}

impl Exporter for DatasetExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in &self.records {
                    wtr.serialize(TrainingRecordFlat {
                        text: &record.text,
                        label: record.label,
                        source: record.source,
                        metadata: serde_json::to_string(&record.metadata)?,
                        created_at: &record.created_at,
                        dataset_version: &record.dataset_version,
                    })?;
                }
                csv_string(wtr)
            }
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.records)?),
        }
    }
}

/// Paths of the files written for a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    /// `training_data.csv`
    pub csv: PathBuf,
    /// `training_data.json`
    pub json: PathBuf,
    /// `dataset_metadata.json`
    pub metadata: PathBuf,
}

impl DatasetFiles {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            csv: dir.join(TRAINING_DATA_CSV),
            json: dir.join(TRAINING_DATA_JSON),
            metadata: dir.join(DATASET_METADATA_JSON),
        }
    }
}
