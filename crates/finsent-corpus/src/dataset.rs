//! The combined, deduplicated corpus.

use crate::error::{CorpusError, Result};
use crate::example::TrainingExample;
use crate::label::{Label, Source};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Version string written with every dataset.
pub const DATASET_VERSION: &str = "1.0";

/// An ordered collection of training examples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    examples: Vec<TrainingExample>,
}

impl Dataset {
    /// Wrap examples as given.
    pub const fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dataset has no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Examples in insertion order.
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Consume into the examples.
    pub fn into_examples(self) -> Vec<TrainingExample> {
        self.examples
    }

    /// Drop examples whose text was already seen, keeping the first.
    ///
    /// Returns the number of examples removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.examples.len();
        let mut seen = HashSet::new();
        self.examples.retain(|e| seen.insert(e.text.clone()));
        before - self.examples.len()
    }

    /// Example count per label.
    pub fn label_distribution(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label).or_insert(0) += 1;
        }
        counts
    }

    /// Example count per source.
    pub fn source_distribution(&self) -> BTreeMap<Source, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.source).or_insert(0) += 1;
        }
        counts
    }

    /// Label counts broken down by source.
    pub fn label_distribution_by_source(&self) -> BTreeMap<Source, BTreeMap<Label, usize>> {
        let mut counts: BTreeMap<Source, BTreeMap<Label, usize>> = BTreeMap::new();
        for example in &self.examples {
            *counts
                .entry(example.source)
                .or_default()
                .entry(example.label)
                .or_insert(0) += 1;
        }
        counts
    }

    /// Log the label distribution with percentages.
    pub fn log_label_distribution(&self) {
        let total = self.len().max(1) as f64;
        for (label, count) in self.label_distribution() {
            tracing::info!(
                %label,
                count,
                share = format!("{:.1}%", count as f64 / total * 100.0),
                "label distribution"
            );
        }
    }

    /// Load the `text,label[,source]` columns of a training CSV.
    ///
    /// Extra columns are ignored. Rows without `source` default to
    /// `sec_filing`.
    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CorpusError::MissingInput(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut examples = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            let label: Label = row.label.parse()?;
            let source = match row.source.as_deref().map(str::trim) {
                None | Some("") => Source::SecFiling,
                Some(s) => s.parse()?,
            };
            let mut example = TrainingExample::new(row.text, label, source);
            if let Some(meta) = row.metadata.as_deref().filter(|m| !m.trim().is_empty())
                && let Ok(parsed) = serde_json::from_str(meta)
            {
                example.metadata = parsed;
            }
            examples.push(example);
        }

        tracing::debug!(path = %path.display(), rows = examples.len(), "loaded dataset");
        Ok(Self::new(examples))
    }
}

impl FromIterator<TrainingExample> for Dataset {
    fn from_iter<I: IntoIterator<Item = TrainingExample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    text: String,
    label: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    metadata: Option<String>,
}

/// Summary of a dataset, written as `dataset_metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Number of examples
    pub total_examples: usize,
    /// Count per label
    pub label_distribution: BTreeMap<Label, usize>,
    /// Count per source
    pub source_distribution: BTreeMap<Source, usize>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Dataset format version
    pub dataset_version: String,
}

impl DatasetMetadata {
    /// Describe `dataset`, stamped with `created_at`.
    pub fn describe(dataset: &Dataset, created_at: &str) -> Self {
        Self {
            total_examples: dataset.len(),
            label_distribution: dataset.label_distribution(),
            source_distribution: dataset.source_distribution(),
            created_at: created_at.to_string(),
            dataset_version: DATASET_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn example(text: &str, label: Label, source: Source) -> TrainingExample {
        TrainingExample::new(text.to_string(), label, source)
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut dataset = Dataset::new(vec![
            example("a", Label::Positive, Source::SecFiling),
            example("b", Label::Neutral, Source::FredData),
            example("a", Label::Negative, Source::PolicyUncertainty),
        ]);
        assert_eq!(dataset.dedup(), 1);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.examples()[0].label, Label::Positive);
        assert_eq!(dataset.dedup(), 0);
    }

    #[test]
    fn test_distributions() {
        let dataset: Dataset = vec![
            example("a", Label::Positive, Source::SecFiling),
            example("b", Label::Neutral, Source::FredData),
            example("c", Label::Neutral, Source::SecFiling),
        ]
        .into_iter()
        .collect();

        let labels = dataset.label_distribution();
        assert_eq!(labels[&Label::Neutral], 2);
        assert!(!labels.contains_key(&Label::Negative));

        let by_source = dataset.label_distribution_by_source();
        assert_eq!(by_source[&Source::SecFiling][&Label::Positive], 1);

        let meta = DatasetMetadata::describe(&dataset, "2025-01-01T00:00:00Z");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["label_distribution"]["neutral"], 2);
        assert_eq!(json["source_distribution"]["sec_filing"], 2);
        assert_eq!(json["dataset_version"], "1.0");
    }

    #[test]
    fn test_read_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "text,label,source,metadata,created_at,dataset_version").unwrap();
        writeln!(file, "\"Profits rose, sharply\",positive,sec_filing,\"{{\"\"form_type\"\":\"\"8-K\"\"}}\",x,1.0").unwrap();
        writeln!(file, "GDP is flat,neutral,fred_data,,x,1.0").unwrap();
        file.flush().unwrap();

        let dataset = Dataset::read_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.examples()[0].text, "Profits rose, sharply");
        assert_eq!(dataset.examples()[0].metadata["form_type"], "8-K");
        assert_eq!(dataset.examples()[1].source, Source::FredData);
    }

    #[test]
    fn test_read_csv_minimal_columns_and_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "text,label").unwrap();
        writeln!(file, "Losses widened,negative").unwrap();
        file.flush().unwrap();
        let dataset = Dataset::read_csv(file.path()).unwrap();
        assert_eq!(dataset.examples()[0].source, Source::SecFiling);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "text,label\nhello,bullish").unwrap();
        bad.flush().unwrap();
        assert!(matches!(
            Dataset::read_csv(bad.path()),
            Err(CorpusError::InvalidLabel(_))
        ));

        let missing = Dataset::read_csv(Path::new("/nonexistent/training_data.csv"));
        assert!(matches!(missing, Err(CorpusError::MissingInput(_))));
    }
}
