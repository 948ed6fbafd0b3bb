//! Training examples.

use crate::label::{Label, Source};
use crate::sections::SectionKind;
use finsent_data::edgar::StoredFiling;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A labeled span of text and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Cleaned text
    pub text: String,
    /// Sentiment label
    pub label: Label,
    /// Originating source
    pub source: Source,
    /// Source specific details (form type, filing date, file name, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl TrainingExample {
    /// Create an example with empty metadata.
    pub const fn new(text: String, label: Label, source: Source) -> Self {
        Self {
            text,
            label,
            source,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach one metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Example taken from a section of a stored filing.
    pub fn from_filing(
        text: String,
        label: Label,
        filing: &StoredFiling,
        file_stem: &str,
        section: SectionKind,
    ) -> Self {
        Self::new(text, label, Source::SecFiling)
            .with_meta("accession_number", filing.accession_number.as_str())
            .with_meta("form_type", filing.form.as_str())
            .with_meta("filing_date", filing.filing_date.as_str())
            .with_meta("filename", file_stem)
            .with_meta("section", section.as_str())
    }

    /// Economic indicator description. Always neutral.
    pub fn from_economic_context(text: String) -> Self {
        let length = text.chars().count();
        Self::new(text, Label::Neutral, Source::FredData)
            .with_meta("data_type", "economic_indicator")
            .with_meta("description_length", length)
    }

    /// Policy uncertainty description. Always neutral.
    pub fn from_policy_context(text: String, file_name: &str) -> Self {
        Self::new(text, Label::Neutral, Source::PolicyUncertainty)
            .with_meta("data_type", "policy_uncertainty")
            .with_meta("filename", file_name)
    }

    /// Metadata serialised as a JSON object string, for flat CSV rows.
    pub fn metadata_json(&self) -> String {
        serde_json::to_string(&self.metadata).unwrap_or_else(|_| "{}".to_string())
    }
}
