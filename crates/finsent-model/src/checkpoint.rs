//! `model.json` persistence.
//!
//! A checkpoint directory holds one JSON document describing the linear
//! model: class names, a `classes x features` weight matrix, biases and the
//! vocabulary that maps tokens to feature columns.

use crate::classifier::SentimentClassifier;
use crate::error::{ModelError, Result};
use crate::tokenizer::Vocabulary;
use finsent_corpus::Label;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name inside a checkpoint directory.
pub const MODEL_FILE: &str = "model.json";

/// Value of the `model_type` field.
pub const MODEL_TYPE: &str = "linear_model";

/// On-disk model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Always [`MODEL_TYPE`]
    pub model_type: String,
    /// Name given when saving
    pub model_name: String,
    /// Model the weights were initialised from
    pub base_model: String,
    /// Vocabulary size
    pub n_features: usize,
    /// Number of labels
    pub n_classes: usize,
    /// Label names ordered by id
    pub classes: Vec<String>,
    /// Tokens considered per text
    pub max_length: usize,
    /// Feature tokens
    pub vocabulary: Vocabulary,
    /// Weights, `[class][feature]`
    pub weights: Vec<Vec<f64>>,
    /// One bias per class
    pub biases: Vec<f64>,
}

impl ModelFile {
    /// Describe `classifier` under `model_name`.
    pub fn from_classifier(classifier: &SentimentClassifier, model_name: &str) -> Self {
        Self {
            model_type: MODEL_TYPE.to_string(),
            model_name: model_name.to_string(),
            base_model: classifier.base_model().to_string(),
            n_features: classifier.vocabulary().len(),
            n_classes: Label::COUNT,
            classes: Label::ALL.iter().map(|l| l.as_str().to_string()).collect(),
            max_length: classifier.max_length(),
            vocabulary: classifier.vocabulary().clone(),
            weights: classifier
                .weights()
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
            biases: classifier.bias().to_vec(),
        }
    }

    /// Check the declared shapes against the arrays.
    pub fn validate(&self) -> Result<()> {
        if self.model_type != MODEL_TYPE {
            return Err(ModelError::Checkpoint(format!(
                "unsupported model_type '{}'",
                self.model_type
            )));
        }
        let expected: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
        if self.classes != expected {
            return Err(ModelError::Checkpoint(format!(
                "classes {:?} do not match {:?}",
                self.classes, expected
            )));
        }
        if self.n_classes != Label::COUNT
            || self.weights.len() != self.n_classes
            || self.biases.len() != self.n_classes
        {
            return Err(ModelError::Checkpoint(format!(
                "n_classes {} disagrees with {} weight rows / {} biases",
                self.n_classes,
                self.weights.len(),
                self.biases.len()
            )));
        }
        if self.vocabulary.len() != self.n_features {
            return Err(ModelError::Checkpoint(format!(
                "n_features {} disagrees with vocabulary of {}",
                self.n_features,
                self.vocabulary.len()
            )));
        }
        if let Some((i, row)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.n_features)
        {
            return Err(ModelError::Checkpoint(format!(
                "weight row {i} has {} values, expected {}",
                row.len(),
                self.n_features
            )));
        }
        if self.max_length == 0 {
            return Err(ModelError::Checkpoint("max_length must be positive".to_string()));
        }
        Ok(())
    }

    /// Validate and convert into a classifier.
    pub fn into_classifier(self) -> Result<SentimentClassifier> {
        self.validate()?;
        let flat: Vec<f64> = self.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((self.n_classes, self.n_features), flat)
            .map_err(|e| ModelError::Checkpoint(e.to_string()))?;
        SentimentClassifier::new(
            self.vocabulary,
            weights,
            Array1::from(self.biases),
            self.max_length,
            self.base_model,
        )
    }
}

/// Whether `dir` contains a model file.
pub fn is_checkpoint_dir(dir: &Path) -> bool {
    dir.join(MODEL_FILE).is_file()
}

/// Write `classifier` to `dir/model.json`, creating `dir`.
pub fn save_model(classifier: &SentimentClassifier, model_name: &str, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(MODEL_FILE);
    let file = ModelFile::from_classifier(classifier, model_name);
    fs::write(&path, serde_json::to_string(&file)?)?;
    tracing::debug!(path = %path.display(), features = file.n_features, "saved model");
    Ok(path)
}

/// Read and validate `dir/model.json`.
pub fn load_model_file(dir: &Path) -> Result<ModelFile> {
    let path = dir.join(MODEL_FILE);
    if !path.is_file() {
        return Err(ModelError::Checkpoint(format!(
            "no {MODEL_FILE} in {}",
            dir.display()
        )));
    }
    let file: ModelFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
    file.validate()?;
    Ok(file)
}

/// Load the classifier saved in `dir`.
pub fn load_model(dir: &Path) -> Result<SentimentClassifier> {
    load_model_file(dir)?.into_classifier()
}
