//! Fine-tuning loop.
//!
//! Mini-batch SGD on the cross-entropy loss. Gradients of
//! `gradient_accumulation_steps` batches are averaged into one optimiser
//! step. Weight decay is decoupled from the gradient and skips the biases.
//! The learning rate warms up linearly for `warmup_steps` and then decays
//! linearly to zero at the last step.

use crate::base::BaseModel;
use crate::checkpoint::save_model;
use crate::classifier::SentimentClassifier;
use crate::error::{ModelError, Result};
use crate::evaluate::{Evaluation, evaluate_encoded};
use crate::split::stratified_split;
use crate::tokenizer::{
    DEFAULT_MAX_LENGTH, DEFAULT_MAX_VOCAB_SIZE, DEFAULT_MIN_FREQ, SparseFeatures, Vocabulary,
    tokenize,
};
use finsent_corpus::{Dataset, Label, TrainingExample};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingArgs {
    /// Passes over the training split
    pub num_train_epochs: usize,
    /// Examples per batch
    pub per_device_train_batch_size: usize,
    /// Examples scored at a time during evaluation
    pub per_device_eval_batch_size: usize,
    /// Batches averaged into one optimiser step
    pub gradient_accumulation_steps: usize,
    /// Peak learning rate
    pub learning_rate: f64,
    /// Decoupled weight decay
    pub weight_decay: f64,
    /// Optimiser steps of linear warmup
    pub warmup_steps: usize,
    /// Log the training loss every this many steps
    pub logging_steps: usize,
    /// Write a checkpoint every this many steps
    pub save_steps: usize,
    /// Evaluate every this many steps
    pub eval_steps: usize,
    /// Checkpoints kept on disk, `0` keeps all
    pub save_total_limit: usize,
    /// Return the best evaluated model rather than the last one
    pub load_best_model_at_end: bool,
    /// Seed for the split and the shuffling
    pub seed: u64,
    /// Tokens considered per text
    pub max_length: usize,
    /// Minimum training-split frequency for a vocabulary token
    pub min_token_freq: usize,
    /// Vocabulary cap, excluding tokens inherited from the base model
    pub max_vocab_size: usize,
    /// Fraction of each label held out for validation
    pub validation_split: f64,
}

impl Default for TrainingArgs {
    fn default() -> Self {
        Self {
            num_train_epochs: 3,
            per_device_train_batch_size: 8,
            per_device_eval_batch_size: 8,
            gradient_accumulation_steps: 4,
            learning_rate: 0.5,
            weight_decay: 0.01,
            warmup_steps: 100,
            logging_steps: 50,
            save_steps: 500,
            eval_steps: 500,
            save_total_limit: 2,
            load_best_model_at_end: true,
            seed: 42,
            max_length: DEFAULT_MAX_LENGTH,
            min_token_freq: DEFAULT_MIN_FREQ,
            max_vocab_size: DEFAULT_MAX_VOCAB_SIZE,
            validation_split: 0.2,
        }
    }
}

impl TrainingArgs {
    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("num_train_epochs", self.num_train_epochs),
            ("per_device_train_batch_size", self.per_device_train_batch_size),
            ("per_device_eval_batch_size", self.per_device_eval_batch_size),
            ("gradient_accumulation_steps", self.gradient_accumulation_steps),
            ("logging_steps", self.logging_steps),
            ("save_steps", self.save_steps),
            ("eval_steps", self.eval_steps),
            ("max_length", self.max_length),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::InvalidArgs(format!("{name} must be positive")));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidArgs(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ModelError::InvalidArgs(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(ModelError::InvalidArgs(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        Ok(())
    }

    /// Learning rate for the zero-based optimiser `step` of `total_steps`.
    pub fn learning_rate_at(&self, step: usize, total_steps: usize) -> f64 {
        if step < self.warmup_steps {
            return self.learning_rate * step as f64 / self.warmup_steps as f64;
        }
        let remaining = total_steps.saturating_sub(step) as f64;
        let span = total_steps.saturating_sub(self.warmup_steps).max(1) as f64;
        self.learning_rate * (remaining / span).max(0.0)
    }
}

/// One entry of the training log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Optimiser step
    pub step: usize,
    /// Fractional epoch
    pub epoch: f64,
    /// Mean training loss since the previous entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss: Option<f64>,
    /// Learning rate used at this step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    /// Validation loss
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_loss: Option<f64>,
    /// Validation accuracy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_accuracy: Option<f64>,
    /// Validation weighted F1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_f1: Option<f64>,
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Returned model
    pub classifier: SentimentClassifier,
    /// Validation scores of the returned model
    pub evaluation: Evaluation,
    /// Loss and evaluation log
    pub log_history: Vec<LogEntry>,
    /// Optimiser steps taken
    pub global_step: usize,
    /// Step of the best evaluation, if the returned model is not the last one
    pub best_step: Option<usize>,
    /// Mean training loss over the run
    pub training_loss: f64,
    /// Training split size
    pub train_examples: usize,
    /// Validation split size
    pub validation_examples: usize,
}

struct Best {
    step: usize,
    f1: f64,
    snapshot: Option<(SentimentClassifier, Evaluation)>,
}

/// Runs fine-tuning with fixed arguments.
#[derive(Debug, Clone)]
pub struct Trainer {
    args: TrainingArgs,
    model_name: String,
    output_dir: Option<PathBuf>,
}

impl Trainer {
    /// Trainer for validated `args`.
    pub fn new(args: TrainingArgs) -> Result<Self> {
        args.validate()?;
        Ok(Self {
            args,
            model_name: "financial_llm".to_string(),
            output_dir: None,
        })
    }

    /// Name recorded in saved models.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Directory for `checkpoint-{step}` folders and the final model.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Arguments in use.
    pub const fn args(&self) -> &TrainingArgs {
        &self.args
    }

    /// Split `dataset` by label and train on it.
    pub fn fit_dataset(&self, base: &BaseModel, dataset: &Dataset) -> Result<TrainingOutcome> {
        if dataset.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let labels: Vec<Label> = dataset.examples().iter().map(|e| e.label).collect();
        let split = stratified_split(&labels, self.args.validation_split, self.args.seed)?;
        let pick = |rows: &[usize]| -> Vec<TrainingExample> {
            rows.iter().map(|&i| dataset.examples()[i].clone()).collect()
        };
        let (train, validation) = (pick(&split.train), pick(&split.validation));
        tracing::info!(
            train = train.len(),
            validation = validation.len(),
            "split dataset"
        );
        self.train(base, &train, &validation)
    }

    /// Train from `base` on `train`, evaluating on `validation`.
    ///
    /// An empty validation set falls back to evaluating on the training set.
    pub fn train(
        &self,
        base: &BaseModel,
        train: &[TrainingExample],
        validation: &[TrainingExample],
    ) -> Result<TrainingOutcome> {
        if train.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let args = &self.args;

        let train_tokens: Vec<Vec<String>> = train
            .iter()
            .map(|e| tokenize(&e.text, args.max_length))
            .collect();
        let corpus_vocab = Vocabulary::build(
            train_tokens.iter().map(Vec::as_slice),
            args.min_token_freq,
            args.max_vocab_size,
        );
        let mut model = base.initialise(&corpus_vocab, args.max_length)?;

        let train_x: Vec<SparseFeatures> = train_tokens
            .iter()
            .map(|t| model.vocabulary().features(t))
            .collect();
        let train_y: Vec<Label> = train.iter().map(|e| e.label).collect();
        let (val_x, val_y): (Vec<SparseFeatures>, Vec<Label>) = if validation.is_empty() {
            tracing::warn!("validation set is empty, evaluating on the training set");
            (train_x.clone(), train_y.clone())
        } else {
            validation
                .iter()
                .map(|e| (model.encode(&e.text), e.label))
                .unzip()
        };

        let batch_size = args.per_device_train_batch_size;
        let batches_per_epoch = train_x.len().div_ceil(batch_size);
        let steps_per_epoch = batches_per_epoch.div_ceil(args.gradient_accumulation_steps);
        let total_steps = steps_per_epoch * args.num_train_epochs;
        tracing::info!(
            base = %base,
            examples = train_x.len(),
            vocabulary = model.vocabulary().len(),
            epochs = args.num_train_epochs,
            total_steps,
            "starting training"
        );

        let mut rng = StdRng::seed_from_u64(args.seed);
        let mut order: Vec<usize> = (0..train_x.len()).collect();
        let mut grad_w = Array2::<f64>::zeros(model.weights().dim());
        let mut grad_b = Array1::<f64>::zeros(Label::COUNT);
        let mut window = (0usize, 0usize);
        let mut step = 0;
        let (mut log_loss, mut log_count) = (0.0, 0usize);
        let (mut total_loss, mut total_count) = (0.0, 0usize);
        let mut log_history = Vec::new();
        let mut best: Option<Best> = None;
        let mut saved: Vec<(usize, PathBuf)> = Vec::new();

        for epoch in 0..args.num_train_epochs {
            order.shuffle(&mut rng);
            for (b, chunk) in order.chunks(batch_size).enumerate() {
                for &i in chunk {
                    let (x, y) = (&train_x[i], train_y[i]);
                    let mut residual = model.probabilities(x);
                    let loss = -residual[y.id()].max(1e-12).ln();
                    log_loss += loss;
                    log_count += 1;
                    total_loss += loss;
                    total_count += 1;

                    residual[y.id()] -= 1.0;
                    grad_b += &residual;
                    for &(j, v) in x {
                        grad_w.column_mut(j).scaled_add(v, &residual);
                    }
                }
                window.0 += 1;
                window.1 += chunk.len();

                let last_batch = b + 1 == batches_per_epoch;
                if window.0 < args.gradient_accumulation_steps && !last_batch {
                    continue;
                }

                let lr = args.learning_rate_at(step, total_steps);
                apply_update(&mut model, &grad_w, &grad_b, window.1, lr, args.weight_decay);
                grad_w.fill(0.0);
                grad_b.fill(0.0);
                window = (0, 0);
                step += 1;
                let epoch_progress = epoch as f64 + (b + 1) as f64 / batches_per_epoch as f64;

                if step % args.logging_steps == 0 {
                    let loss = log_loss / log_count.max(1) as f64;
                    tracing::info!(step, epoch = epoch_progress, loss, learning_rate = lr, "training");
                    log_history.push(LogEntry {
                        step,
                        epoch: epoch_progress,
                        loss: Some(loss),
                        learning_rate: Some(lr),
                        ..LogEntry::default()
                    });
                    (log_loss, log_count) = (0.0, 0);
                }

                if step % args.eval_steps == 0 {
                    let evaluation =
                        evaluate_encoded(&model, &val_x, &val_y, args.per_device_eval_batch_size)?;
                    log_history.push(eval_entry(step, epoch_progress, &evaluation));
                    self.track_best(&mut best, step, &model, evaluation);
                }

                if step % args.save_steps == 0
                    && let Some(dir) = &self.output_dir
                {
                    let checkpoint = dir.join(format!("checkpoint-{step}"));
                    save_model(&model, &self.model_name, &checkpoint)?;
                    saved.push((step, checkpoint));
                    let keep = best
                        .as_ref()
                        .filter(|_| args.load_best_model_at_end)
                        .map(|b| b.step);
                    rotate_checkpoints(&mut saved, args.save_total_limit, keep);
                }
            }
        }

        let final_eval = evaluate_encoded(&model, &val_x, &val_y, args.per_device_eval_batch_size)?;
        let (classifier, evaluation, best_step) = match best {
            Some(Best {
                step: best_step,
                f1,
                snapshot: Some((snapshot, snapshot_eval)),
            }) if f1 > final_eval.metrics.f1 => {
                tracing::info!(best_step, f1, "loading best model");
                (snapshot, snapshot_eval, Some(best_step))
            }
            _ => (model, final_eval, None),
        };
        tracing::info!(
            step,
            accuracy = evaluation.metrics.accuracy,
            f1 = evaluation.metrics.f1,
            "training complete"
        );

        if let Some(dir) = &self.output_dir {
            save_model(&classifier, &self.model_name, dir)?;
        }

        Ok(TrainingOutcome {
            classifier,
            evaluation,
            log_history,
            global_step: step,
            best_step,
            training_loss: total_loss / total_count.max(1) as f64,
            train_examples: train_x.len(),
            validation_examples: validation.len(),
        })
    }

    fn track_best(
        &self,
        best: &mut Option<Best>,
        step: usize,
        model: &SentimentClassifier,
        evaluation: Evaluation,
    ) {
        let f1 = evaluation.metrics.f1;
        if best.as_ref().is_some_and(|b| f1 <= b.f1) {
            return;
        }
        let snapshot = self
            .args
            .load_best_model_at_end
            .then(|| (model.clone(), evaluation));
        *best = Some(Best { step, f1, snapshot });
    }
}

fn eval_entry(step: usize, epoch: f64, evaluation: &Evaluation) -> LogEntry {
    tracing::info!(
        step,
        eval_loss = evaluation.loss,
        accuracy = evaluation.metrics.accuracy,
        f1 = evaluation.metrics.f1,
        "evaluation"
    );
    LogEntry {
        step,
        epoch,
        eval_loss: Some(evaluation.loss),
        eval_accuracy: Some(evaluation.metrics.accuracy),
        eval_f1: Some(evaluation.metrics.f1),
        ..LogEntry::default()
    }
}

fn apply_update(
    model: &mut SentimentClassifier,
    grad_w: &Array2<f64>,
    grad_b: &Array1<f64>,
    examples: usize,
    lr: f64,
    weight_decay: f64,
) {
    let scale = -lr / examples.max(1) as f64;
    let (weights, bias) = model.params_mut();
    if weight_decay > 0.0 {
        let keep = 1.0 - lr * weight_decay;
        weights.mapv_inplace(|w| w * keep);
    }
    weights.scaled_add(scale, grad_w);
    bias.scaled_add(scale, grad_b);
}

/// Delete the oldest checkpoints beyond `limit`, sparing `keep_step`.
fn rotate_checkpoints(saved: &mut Vec<(usize, PathBuf)>, limit: usize, keep_step: Option<usize>) {
    if limit == 0 {
        return;
    }
    while saved.len() > limit {
        let Some(pos) = saved.iter().position(|(s, _)| Some(*s) != keep_step) else {
            break;
        };
        let (_, dir) = saved.remove(pos);
        remove_checkpoint(&dir);
    }
}

fn remove_checkpoint(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "removed old checkpoint"),
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "failed to remove checkpoint"),
    }
}
