//! Corpus assembly from the raw data directories.

use crate::clean::clean_text;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::example::TrainingExample;
use crate::label::Label;
use crate::sections::extract_sections;
use crate::sentiment::label_filing_text;
use finsent_data::edgar::StoredFiling;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// SEC examples must be longer than this many characters.
pub const MIN_SEC_CHARS: usize = 100;

/// FRED and policy examples must be longer than this many characters.
pub const MIN_CONTEXT_CHARS: usize = 50;

/// Name of the combined FRED description file.
pub const COMBINED_ECONOMIC_CONTEXT: &str = "combined_economic_context.txt";

/// Examples contributed by each source before deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    /// SEC filing sections
    pub sec_filings: usize,
    /// FRED indicator descriptions
    pub fred_data: usize,
    /// Policy uncertainty descriptions
    pub policy_uncertainty: usize,
}

/// Outcome of a preparation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparationSummary {
    /// Examples after deduplication
    pub total_examples: usize,
    /// Per-source counts before deduplication
    pub counts: SourceCounts,
    /// Duplicates dropped
    pub duplicates_removed: usize,
    /// Final label distribution
    pub label_distribution: BTreeMap<Label, usize>,
}

/// Files in `dir` with the given extension, sorted by name.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .collect();
    files.sort();
    Ok(files)
}

/// Read a file as UTF-8, replacing invalid sequences.
fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collects training examples from each raw data source.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    examples: Vec<TrainingExample>,
    counts: SourceCounts,
}

impl CorpusBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Examples gathered so far.
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Process every `*.txt` filing in `dir`.
    ///
    /// File names carry the accession number, form type and filing date.
    /// Each extracted section becomes one example labeled by the keyword
    /// rules for its form. Unreadable or misnamed files are skipped.
    pub fn process_sec_filings(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "SEC filings directory not found");
            return Ok(0);
        }

        let mut processed = 0;
        for path in files_with_extension(dir, "txt")? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(filing) = StoredFiling::from_stem(stem) else {
                tracing::warn!(file = %path.display(), "unrecognised filing file name");
                continue;
            };
            let content = match read_lossy(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "failed to read filing");
                    continue;
                }
            };

            for section in extract_sections(&content, &filing.form) {
                let text = clean_text(&section.text);
                if text.chars().count() <= MIN_SEC_CHARS {
                    continue;
                }
                let label = label_filing_text(&text, &filing.form);
                self.examples.push(TrainingExample::from_filing(
                    text,
                    label,
                    &filing,
                    stem,
                    section.kind,
                ));
                processed += 1;
                if processed % 10 == 0 {
                    tracing::info!(processed, "processing SEC filings");
                }
            }
        }

        self.counts.sec_filings += processed;
        tracing::info!(examples = processed, "completed SEC filings processing");
        Ok(processed)
    }

    /// Process FRED descriptions.
    ///
    /// Reads `combined_economic_context.txt` (blank-line separated). When it
    /// is absent, falls back to the `text_descriptions` of each `*_data.json`.
    pub fn process_fred_data(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "FRED data directory not found");
            return Ok(0);
        }

        let combined = dir.join(COMBINED_ECONOMIC_CONTEXT);
        let descriptions: Vec<String> = if combined.is_file() {
            read_lossy(&combined)?
                .split("\n\n")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            let mut all = Vec::new();
            for path in files_with_extension(dir, "json")? {
                match read_descriptions(&path) {
                    Ok(texts) => all.extend(texts),
                    Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping FRED file"),
                }
            }
            all
        };

        let mut processed = 0;
        for description in descriptions {
            let text = clean_text(&description);
            if text.chars().count() > MIN_CONTEXT_CHARS {
                self.examples.push(TrainingExample::from_economic_context(text));
                processed += 1;
            }
        }

        self.counts.fred_data += processed;
        tracing::info!(examples = processed, "completed FRED data processing");
        Ok(processed)
    }

    /// Process policy uncertainty descriptions from every `*.json` in `dir`.
    pub fn process_policy_uncertainty(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "policy uncertainty directory not found");
            return Ok(0);
        }

        let mut processed = 0;
        for path in files_with_extension(dir, "json")? {
            let texts = match read_descriptions(&path) {
                Ok(texts) => texts,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping policy file");
                    continue;
                }
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for description in texts {
                let text = clean_text(&description);
                if text.chars().count() > MIN_CONTEXT_CHARS {
                    self.examples
                        .push(TrainingExample::from_policy_context(text, &file_name));
                    processed += 1;
                }
            }
        }

        self.counts.policy_uncertainty += processed;
        tracing::info!(examples = processed, "completed policy uncertainty processing");
        Ok(processed)
    }

    /// Deduplicate and return the dataset with a summary.
    pub fn build(self) -> (Dataset, PreparationSummary) {
        let mut dataset = Dataset::new(self.examples);
        let duplicates_removed = dataset.dedup();
        if duplicates_removed > 0 {
            tracing::info!(duplicates_removed, "removed duplicate entries");
        }

        if dataset.is_empty() {
            tracing::warn!("no training data was created");
        } else {
            dataset.log_label_distribution();
        }

        let summary = PreparationSummary {
            total_examples: dataset.len(),
            counts: self.counts,
            duplicates_removed,
            label_distribution: dataset.label_distribution(),
        };
        (dataset, summary)
    }
}

/// Text descriptions from a JSON file.
///
/// Accepts an object with a `text_descriptions` array or a bare array of
/// strings. Anything else yields no descriptions.
pub fn read_descriptions(path: &Path) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(&read_lossy(path)?)?;
    let items: &[Value] = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("text_descriptions") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Run all three sources against the standard raw data layout.
pub fn prepare_corpus(
    sec_dir: &Path,
    fred_dir: &Path,
    policy_dir: &Path,
) -> Result<(Dataset, PreparationSummary)> {
    let mut builder = CorpusBuilder::new();
    builder.process_sec_filings(sec_dir)?;
    builder.process_fred_data(fred_dir)?;
    builder.process_policy_uncertainty(policy_dir)?;
    Ok(builder.build())
}
