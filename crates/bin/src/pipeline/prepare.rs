//! Corpus preparation from the collected raw data.

use chrono::Utc;
use finsent::DataLayout;
use finsent_corpus::{PreparationSummary, prepare_corpus};
use finsent_output::{DatasetExport, DatasetFiles, preparation_report};

/// Build the corpus from `layout`'s raw directories and export it.
///
/// Returns the written files, or `None` when no examples were produced.
pub(crate) fn run_prepare(
    layout: &DataLayout,
) -> Result<(PreparationSummary, Option<DatasetFiles>), Box<dyn std::error::Error>> {
    tracing::info!(root = %layout.root().display(), "preparing training data");
    let (dataset, summary) = prepare_corpus(
        &layout.sec_filings_dir(),
        &layout.fred_data_dir(),
        &layout.policy_dir(),
    )?;

    println!("{}", preparation_report(&summary));

    if dataset.is_empty() {
        tracing::warn!("no training data was created, nothing written");
        return Ok((summary, None));
    }

    let export = DatasetExport::new(&dataset, Utc::now());
    let files = export.write_to_dir(&layout.processed_dir())?;
    println!("Training data saved to: {}", files.csv.display());
    println!("Metadata saved to: {}", files.metadata.display());
    Ok((summary, Some(files)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsent_corpus::Dataset;
    use std::fs;

    #[test]
    fn test_prepare_writes_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.create_all().unwrap();
        fs::write(
            layout.fred_data_dir().join("combined_economic_context.txt"),
            "The Unemployment Rate is currently 4.10. Percentage of the labor force that is unemployed.\n\n\
             The Unemployment Rate is currently 4.10. Percentage of the labor force that is unemployed.\n\n",
        )
        .unwrap();
        fs::write(
            layout.policy_dir().join("policy_uncertainty_context.json"),
            r#"["As of 2024-05-01, the Economic Policy Uncertainty Index stands at 120.00."]"#,
        )
        .unwrap();

        let (summary, files) = run_prepare(&layout).unwrap();
        assert_eq!(summary.counts.fred_data, 2);
        assert_eq!(summary.counts.policy_uncertainty, 1);
        assert_eq!(summary.duplicates_removed, 1);

        let files = files.unwrap();
        let dataset = Dataset::read_csv(&files.csv).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(files.metadata.is_file());
    }

    #[test]
    fn test_empty_corpus_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let (summary, files) = run_prepare(&layout).unwrap();
        assert_eq!(summary.total_examples, 0);
        assert!(files.is_none());
        assert!(!layout.processed_dir().exists());
    }
}
