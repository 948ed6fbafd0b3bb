#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/troyonix/finsent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod clean;
pub mod dataset;
pub mod economic;
pub mod error;
pub mod example;
pub mod label;
pub mod prepare;
pub mod sections;
pub mod sentiment;

pub use analysis::{DatasetAnalysis, SourceBreakdown, analyze_dataset};
pub use clean::{clean_text, html_to_text};
pub use dataset::{DATASET_VERSION, Dataset, DatasetMetadata};
pub use error::{CorpusError, Result};
pub use example::TrainingExample;
pub use label::{Label, Source};
pub use prepare::{CorpusBuilder, PreparationSummary, SourceCounts, prepare_corpus};
pub use sections::{Section, SectionKind, extract_sections};
pub use sentiment::{keyword_polarity, label_filing_text};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
