//! Integration tests for dataset export and training reports.

use chrono::{TimeZone, Utc};
use finsent_corpus::{Dataset, Label, Source, TrainingExample, analyze_dataset};
use finsent_model::{
    BaseModel, Trainer, TrainingArgs, Vocabulary, evaluate_builtin, run_inference_examples,
};
use finsent_output::{
    DatasetExport, EvaluationSummary, TrainingReportBuilder, analysis_report, inference_report,
};
use std::fs;

fn dataset() -> Dataset {
    let rows = [
        ("Revenue growth was strong and profit improved.", Label::Positive, Source::SecFiling),
        ("Strong revenue growth lifted profit again.", Label::Positive, Source::SecFiling),
        ("Losses widened amid declining demand and risk.", Label::Negative, Source::SecFiling),
        ("Declining demand widened losses and risk.", Label::Negative, Source::SecFiling),
        ("The GDP is currently 100.00 and remained stable.", Label::Neutral, Source::FredData),
        ("The index remained stable this period overall.", Label::Neutral, Source::PolicyUncertainty),
    ];
    rows.into_iter()
        .map(|(t, l, s)| TrainingExample::new(t.to_string(), l, s))
        .collect()
}

#[test]
fn test_export_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let files = DatasetExport::new(&dataset(), created)
        .write_to_dir(dir.path())
        .unwrap();

    let reread = Dataset::read_csv(&files.csv).unwrap();
    assert_eq!(reread.len(), 6);
    assert_eq!(reread.examples()[2].label, Label::Negative);
    assert_eq!(reread.examples()[5].source, Source::PolicyUncertainty);

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files.json).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 6);

    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files.metadata).unwrap()).unwrap();
    assert_eq!(metadata["total_examples"], 6);
    assert_eq!(metadata["label_distribution"]["positive"], 2);
    assert_eq!(metadata["source_distribution"]["fred_data"], 1);
    assert_eq!(metadata["created_at"], "2025-06-01T12:00:00Z");
}

#[test]
fn test_training_report_contents() {
    let dataset = dataset();
    let args = TrainingArgs {
        num_train_epochs: 2,
        warmup_steps: 0,
        validation_split: 0.0,
        min_token_freq: 1,
        ..TrainingArgs::default()
    };
    let outcome = Trainer::new(args.clone())
        .unwrap()
        .fit_dataset(&BaseModel::Lexicon, &dataset)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let report = TrainingReportBuilder::new()
        .model_name("financial_llm")
        .training_args(args)
        .outcome(&outcome)
        .dataset(&dataset)
        .build()
        .unwrap();
    let path = report.write_to_dir(dir.path()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["model_name"], "financial_llm");
    assert_eq!(json["base_model"], "builtin:finance-lexicon");
    assert_eq!(json["label_mapping"]["neutral"], 1);
    assert_eq!(json["max_length"], 512);
    assert_eq!(json["training_args"]["num_train_epochs"], 2);
    assert_eq!(json["training_data_info"]["total_examples"], 6);
    assert_eq!(json["training_data_info"]["validation_examples"], 0);
    assert!(json["eval_results"]["eval_f1"].is_number());
    assert_eq!(json["eval_results"]["confusion_matrix"].as_array().unwrap().len(), 3);
}

#[test]
fn test_summaries_render() {
    let model = BaseModel::Lexicon
        .initialise(&Vocabulary::default(), 512)
        .unwrap();
    let evaluation = evaluate_builtin(&model).unwrap();
    let summary = EvaluationSummary {
        dataset_name: "built-in examples".to_string(),
        examples: 9,
        loss: evaluation.loss,
        metrics: evaluation.metrics,
    };
    let ascii = summary.to_ascii_table();
    assert!(ascii.contains("Accuracy"));
    assert!(ascii.contains("Confusion matrix"));
    assert!(summary.to_markdown().contains("| Label |"));

    let inference = inference_report(&run_inference_examples(&model));
    assert!(inference.contains("--- Negative Examples ---"));
    assert!(inference.contains("Confidence:"));

    let analysis = analysis_report(&analyze_dataset(&dataset()));
    assert!(analysis.contains("sec_filing (4 examples)"));
    assert!(analysis.contains("policy_uncertainty (1 examples)"));
}
