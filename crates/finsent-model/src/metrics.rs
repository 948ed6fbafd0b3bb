//! Classification metrics.
//!
//! Weighted averages follow the usual convention: each label's score is
//! weighted by its support, and a score whose denominator is zero (no
//! predictions for precision, no support for recall) counts as zero.

use crate::error::{ModelError, Result};
use finsent_corpus::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts of `(true label, predicted label)` pairs. Rows are true labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; Label::COUNT]; Label::COUNT],
}

impl ConfusionMatrix {
    /// Tally paired labels.
    pub fn from_labels(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "{} true labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }
        let mut matrix = Self::default();
        for (t, p) in truth.iter().zip(predicted) {
            matrix.counts[t.id()][p.id()] += 1;
        }
        Ok(matrix)
    }

    /// Matrix from raw counts.
    pub const fn from_counts(counts: [[usize; Label::COUNT]; Label::COUNT]) -> Self {
        Self { counts }
    }

    /// Raw counts, indexed `[true][predicted]` by label id.
    pub const fn counts(&self) -> &[[usize; Label::COUNT]; Label::COUNT] {
        &self.counts
    }

    /// Number of pairs.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Correct predictions.
    pub fn correct(&self) -> usize {
        (0..Label::COUNT).map(|i| self.counts[i][i]).sum()
    }

    /// Rows whose true label is `label`.
    pub fn support(&self, label: Label) -> usize {
        self.counts[label.id()].iter().sum()
    }

    /// Rows predicted as `label`.
    pub fn predicted(&self, label: Label) -> usize {
        self.counts.iter().map(|row| row[label.id()]).sum()
    }
}

/// Scores for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1: f64,
    /// True rows with this label
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Accuracy, weighted precision/recall/F1 and per-label reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Fraction of correct predictions
    pub accuracy: f64,
    /// Support-weighted precision
    pub precision: f64,
    /// Support-weighted recall
    pub recall: f64,
    /// Support-weighted F1
    pub f1: f64,
    /// Scores per label
    pub per_class: BTreeMap<Label, ClassReport>,
    /// Underlying counts
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// Metrics for paired labels.
    pub fn compute(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        Ok(Self::from_confusion(ConfusionMatrix::from_labels(truth, predicted)?))
    }

    /// Metrics from a confusion matrix.
    pub fn from_confusion(matrix: ConfusionMatrix) -> Self {
        let total = matrix.total();
        let mut per_class = BTreeMap::new();
        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);

        for label in Label::ALL {
            let tp = matrix.counts[label.id()][label.id()];
            let support = matrix.support(label);
            let p = ratio(tp, matrix.predicted(label));
            let r = ratio(tp, support);
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

            let weight = ratio(support, total);
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;

            per_class.insert(
                label,
                ClassReport {
                    precision: p,
                    recall: r,
                    f1: f,
                    support,
                },
            );
        }

        Self {
            accuracy: ratio(matrix.correct(), total),
            precision,
            recall,
            f1,
            per_class,
            confusion_matrix: matrix,
        }
    }
}
