//! Training report written next to a fine-tuned model.

use chrono::{DateTime, Utc};
use finsent_corpus::{Dataset, Label, Source};
use finsent_model::{ClassReport, Evaluation, LogEntry, TrainingArgs, TrainingOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the training report.
pub const TRAINING_RESULTS_JSON: &str = "training_results.json";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field was not set on the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Validation scores in the flat `eval_*` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResults {
    /// Mean cross-entropy
    pub eval_loss: f64,
    /// Accuracy
    pub eval_accuracy: f64,
    /// Weighted precision
    pub eval_precision: f64,
    /// Weighted recall
    pub eval_recall: f64,
    /// Weighted F1
    pub eval_f1: f64,
    /// Per-label scores
    pub per_class: BTreeMap<Label, ClassReport>,
    /// Confusion matrix rows, true label by predicted label
    pub confusion_matrix: Vec<Vec<usize>>,
}

impl From<&Evaluation> for EvalResults {
    fn from(evaluation: &Evaluation) -> Self {
        let m = &evaluation.metrics;
        Self {
            eval_loss: evaluation.loss,
            eval_accuracy: m.accuracy,
            eval_precision: m.precision,
            eval_recall: m.recall,
            eval_f1: m.f1,
            per_class: m.per_class.clone(),
            confusion_matrix: m
                .confusion_matrix
                .counts()
                .iter()
                .map(|row| row.to_vec())
                .collect(),
        }
    }
}

/// Size and composition of the data a model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDataInfo {
    /// Examples in the dataset
    pub total_examples: usize,
    /// Training split size
    pub train_examples: usize,
    /// Validation split size
    pub validation_examples: usize,
    /// Count per label
    pub label_distribution: BTreeMap<Label, usize>,
    /// Count per source
    pub source_distribution: BTreeMap<Source, usize>,
}

/// Contents of `training_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Name the model was saved under
    pub model_name: String,
    /// Base model identifier
    pub base_model: String,
    /// Hyperparameters used
    pub training_args: TrainingArgs,
    /// Validation scores of the saved model
    pub eval_results: EvalResults,
    /// Label name to id
    pub label_mapping: BTreeMap<String, usize>,
    /// Tokens considered per text
    pub max_length: usize,
    /// Dataset composition
    pub training_data_info: TrainingDataInfo,
    /// Optimiser steps taken
    pub global_step: usize,
    /// Step the saved model comes from, if not the last
    pub best_step: Option<usize>,
    /// Mean training loss
    pub training_loss: f64,
    /// Loss and evaluation log
    pub log_history: Vec<LogEntry>,
    /// When training finished
    pub training_date: DateTime<Utc>,
}

impl TrainingReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `training_results.json` into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(TRAINING_RESULTS_JSON);
        fs::write(&path, self.to_json()?)?;
        Ok(path)
    }
}

/// Builder for [`TrainingReport`].
#[derive(Debug, Default)]
pub struct TrainingReportBuilder<'a> {
    model_name: Option<String>,
    training_args: Option<TrainingArgs>,
    outcome: Option<&'a TrainingOutcome>,
    dataset: Option<&'a Dataset>,
    training_date: Option<DateTime<Utc>>,
}

impl<'a> TrainingReportBuilder<'a> {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model name.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Set the training arguments.
    pub fn training_args(mut self, args: TrainingArgs) -> Self {
        self.training_args = Some(args);
        self
    }

    /// Set the training outcome.
    pub const fn outcome(mut self, outcome: &'a TrainingOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set the dataset trained on.
    pub const fn dataset(mut self, dataset: &'a Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Override the training date. Defaults to now.
    pub const fn training_date(mut self, date: DateTime<Utc>) -> Self {
        self.training_date = Some(date);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<TrainingReport, ReportError> {
        let outcome = self.outcome.ok_or(ReportError::MissingField("outcome"))?;
        let dataset = self.dataset.ok_or(ReportError::MissingField("dataset"))?;
        let training_args = self
            .training_args
            .ok_or(ReportError::MissingField("training_args"))?;

        Ok(TrainingReport {
            model_name: self.model_name.unwrap_or_else(|| "financial_llm".to_string()),
            base_model: outcome.classifier.base_model().to_string(),
            training_args,
            eval_results: EvalResults::from(&outcome.evaluation),
            label_mapping: Label::mapping(),
            max_length: outcome.classifier.max_length(),
            training_data_info: TrainingDataInfo {
                total_examples: dataset.len(),
                train_examples: outcome.train_examples,
                validation_examples: outcome.validation_examples,
                label_distribution: dataset.label_distribution(),
                source_distribution: dataset.source_distribution(),
            },
            global_step: outcome.global_step,
            best_step: outcome.best_step,
            training_loss: outcome.training_loss,
            log_history: outcome.log_history.clone(),
            training_date: self.training_date.unwrap_or_else(Utc::now),
        })
    }
}
