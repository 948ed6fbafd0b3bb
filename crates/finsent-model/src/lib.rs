#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/troyonix/finsent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod base;
pub mod checkpoint;
pub mod classifier;
pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod split;
pub mod tokenizer;
pub mod train;

pub use base::{BaseModel, LEXICON_BASE_MODEL};
pub use checkpoint::{MODEL_FILE, ModelFile, load_model, save_model};
pub use classifier::{Prediction, SentimentClassifier};
pub use error::{ModelError, Result};
pub use evaluate::{
    BUILTIN_TEST_SET, Evaluation, INFERENCE_EXAMPLES, InferenceResult, evaluate, evaluate_builtin,
    evaluate_dataset, infer, run_inference_examples,
};
pub use metrics::{ClassReport, ClassificationMetrics, ConfusionMatrix};
pub use split::{SplitIndices, stratified_split};
pub use tokenizer::{Vocabulary, tokenize};
pub use train::{LogEntry, Trainer, TrainingArgs, TrainingOutcome};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
