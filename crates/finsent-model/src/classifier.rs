//! Linear sentiment classifier.

use crate::error::{ModelError, Result};
use crate::tokenizer::{SparseFeatures, Vocabulary, tokenize};
use finsent_corpus::Label;
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::collections::BTreeMap;

/// Numerically stable softmax.
pub fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// A single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Most probable label
    pub label: Label,
    /// Probability of `label`
    pub confidence: f64,
    /// Probability per label
    pub probabilities: BTreeMap<Label, f64>,
}

/// Multinomial logistic regression over bag-of-words features.
///
/// `weights` is `classes x vocabulary`, rows ordered by label id.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentClassifier {
    vocab: Vocabulary,
    weights: Array2<f64>,
    bias: Array1<f64>,
    max_length: usize,
    base_model: String,
}

impl SentimentClassifier {
    /// Assemble a classifier, checking that the shapes agree.
    pub fn new(
        vocab: Vocabulary,
        weights: Array2<f64>,
        bias: Array1<f64>,
        max_length: usize,
        base_model: impl Into<String>,
    ) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows != Label::COUNT || bias.len() != Label::COUNT {
            return Err(ModelError::DimensionMismatch(format!(
                "expected {} classes, got {rows} weight rows and {} biases",
                Label::COUNT,
                bias.len()
            )));
        }
        if cols != vocab.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "weights have {cols} columns but vocabulary has {} tokens",
                vocab.len()
            )));
        }
        Ok(Self {
            vocab,
            weights,
            bias,
            max_length,
            base_model: base_model.into(),
        })
    }

    /// Classifier with all parameters at zero.
    pub fn zeros(vocab: Vocabulary, max_length: usize, base_model: impl Into<String>) -> Self {
        let n = vocab.len();
        Self {
            vocab,
            weights: Array2::zeros((Label::COUNT, n)),
            bias: Array1::zeros(Label::COUNT),
            max_length,
            base_model: base_model.into(),
        }
    }

    /// Vocabulary.
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Weight matrix.
    pub const fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Bias vector.
    pub const fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    pub(crate) fn params_mut(&mut self) -> (&mut Array2<f64>, &mut Array1<f64>) {
        (&mut self.weights, &mut self.bias)
    }

    /// Tokens considered per text.
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Name of the model this one was initialised from.
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Feature vector for `text`.
    pub fn encode(&self, text: &str) -> SparseFeatures {
        self.vocab.features(&tokenize(text, self.max_length))
    }

    /// Raw scores for an encoded text.
    pub fn logits(&self, features: &[(usize, f64)]) -> Array1<f64> {
        let mut logits = self.bias.clone();
        for &(j, x) in features {
            logits.scaled_add(x, &self.weights.column(j));
        }
        logits
    }

    /// Class probabilities for an encoded text.
    pub fn probabilities(&self, features: &[(usize, f64)]) -> Array1<f64> {
        softmax(&self.logits(features))
    }

    /// Class probabilities for `text`, indexed by label id.
    pub fn predict_proba(&self, text: &str) -> Array1<f64> {
        self.probabilities(&self.encode(text))
    }

    /// Most probable label and its probability.
    pub fn predict(&self, text: &str) -> Prediction {
        let probs = self.predict_proba(text);
        let (best, confidence) = argmax(&probs);
        Prediction {
            label: label_at(best),
            confidence,
            probabilities: Label::ALL
                .iter()
                .map(|&label| (label, probs[label.id()]))
                .collect(),
        }
    }

    /// Labels for a batch of texts.
    pub fn predict_labels<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Label> {
        texts
            .iter()
            .map(|t| self.predict(t.as_ref()).label)
            .collect()
    }
}

/// Index and value of the largest entry. Ties go to the lowest index.
pub(crate) fn argmax(values: &Array1<f64>) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
            if v > best.1 { (i, v) } else { best }
        })
}

pub(crate) fn label_at(index: usize) -> Label {
    Label::ALL[index.min(Label::COUNT - 1)]
}
