#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/troyonix/finsent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{
    DATASET_METADATA_JSON, DatasetExport, DatasetFiles, ExportError, ExportFormat, Exporter,
    TRAINING_DATA_CSV, TRAINING_DATA_JSON, TrainingRecord,
};
pub use report::{
    EvalResults, ReportError, TRAINING_RESULTS_JSON, TrainingDataInfo, TrainingReport,
    TrainingReportBuilder,
};
pub use summary::{
    CollectionSummary, EvaluationSummary, PhaseResult, PhaseStatus, analysis_report,
    inference_report, preparation_report,
};
