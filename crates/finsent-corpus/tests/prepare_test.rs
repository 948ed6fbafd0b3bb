//! End to end corpus preparation over a temporary raw data tree.

use finsent_corpus::{Label, SectionKind, Source, prepare_corpus};
use std::fs;
use std::path::Path;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn paragraph(sentence: &str) -> String {
    std::iter::repeat_n(sentence, 8).collect::<Vec<_>>().join(" ")
}

#[test]
fn builds_corpus_from_all_sources() {
    let root = tempfile::tempdir().unwrap();
    let sec = root.path().join("sec_filings");
    let fred = root.path().join("fred_data");
    let policy = root.path().join("policy_uncertainty");

    let annual = format!(
        "<html><body><p>Item 1A. Risk Factors</p><p>{}</p>\
         <p>Item 1B. Unresolved Staff Comments</p><p>None.</p>\
         <p>Item 7. Management's Discussion and Analysis</p><p>{}</p>\
         <p>Item 8. Financial Statements</p></body></html>",
        paragraph("Competition and supply chain disruption pose a material risk of loss."),
        paragraph("Net sales grew on strong demand and higher services revenue."),
    );
    write(&sec.join("000032019323000106_10-K_2023-11-03.txt"), &annual);

    let current = paragraph("The company reported record profit and revenue growth with strong results.");
    write(&sec.join("000032019324000006_8-K_2024-02-01.txt"), &current);
    // Identical text under another name is a duplicate
    write(&sec.join("000032019324000007_8-K_2024-02-02.txt"), &current);
    write(&sec.join("notes.txt"), "not a filing");
    write(&sec.join("000032019324000008_8-K_2024-02-03.txt"), "too short");

    write(
        &fred.join("combined_economic_context.txt"),
        "The Unemployment Rate is currently 4.20. Percentage of the labor force that is unemployed.\n\n\
         short\n\n\
         The Federal Funds Rate shows a current reading of 5.33 across the period.\n\n",
    );

    write(
        &policy.join("policy_uncertainty_context.json"),
        r#"["As of 2024-05-01, the Economic Policy Uncertainty Index stands at 120.00. This represents the current level of policy uncertainty."]"#,
    );
    write(&policy.join("download_summary.json"), r#"{"total_series": 1}"#);

    let (dataset, summary) = prepare_corpus(&sec, &fred, &policy).unwrap();

    assert_eq!(summary.counts.sec_filings, 4);
    assert_eq!(summary.counts.fred_data, 2);
    assert_eq!(summary.counts.policy_uncertainty, 1);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.total_examples, 6);
    assert_eq!(dataset.len(), 6);

    let sec_examples: Vec<_> = dataset
        .examples()
        .iter()
        .filter(|e| e.source == Source::SecFiling)
        .collect();
    assert_eq!(sec_examples.len(), 3);
    assert_eq!(sec_examples[0].metadata["section"], SectionKind::RiskFactors.as_str());
    assert_eq!(sec_examples[0].label, Label::Neutral);
    assert_eq!(sec_examples[1].metadata["section"], SectionKind::Mdna.as_str());
    assert_eq!(sec_examples[2].metadata["form_type"], "8-K");
    assert_eq!(sec_examples[2].label, Label::Positive);

    assert!(
        dataset
            .examples()
            .iter()
            .filter(|e| e.source != Source::SecFiling)
            .all(|e| e.label == Label::Neutral)
    );
}
