//! Per-source breakdown of a prepared dataset.

use crate::dataset::Dataset;
use crate::label::{Label, Source};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sample texts kept per label and source.
pub const SAMPLES_PER_LABEL: usize = 2;

/// Sample texts are cut to this many characters.
pub const SAMPLE_CHARS: usize = 200;

/// Label counts and sample texts for one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceBreakdown {
    /// Examples from this source
    pub total: usize,
    /// Count per label
    pub labels: BTreeMap<Label, usize>,
    /// Up to [`SAMPLES_PER_LABEL`] truncated texts per label
    pub samples: BTreeMap<Label, Vec<String>>,
}

/// Breakdown of a dataset by source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetAnalysis {
    /// Total examples
    pub total_examples: usize,
    /// Overall count per label
    pub label_distribution: BTreeMap<Label, usize>,
    /// Per-source details
    pub sources: BTreeMap<Source, SourceBreakdown>,
}

fn truncate_sample(text: &str) -> String {
    if text.chars().count() > SAMPLE_CHARS {
        let head: String = text.chars().take(SAMPLE_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Analyse `dataset`, keeping the first samples seen for each label.
pub fn analyze_dataset(dataset: &Dataset) -> DatasetAnalysis {
    let mut sources: BTreeMap<Source, SourceBreakdown> = BTreeMap::new();
    for example in dataset.examples() {
        let entry = sources.entry(example.source).or_default();
        entry.total += 1;
        *entry.labels.entry(example.label).or_insert(0) += 1;
        let samples = entry.samples.entry(example.label).or_default();
        if samples.len() < SAMPLES_PER_LABEL {
            samples.push(truncate_sample(&example.text));
        }
    }

    DatasetAnalysis {
        total_examples: dataset.len(),
        label_distribution: dataset.label_distribution(),
        sources,
    }
}
