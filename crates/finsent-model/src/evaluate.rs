//! Evaluation on labeled text and the built-in example sets.

use crate::classifier::{Prediction, SentimentClassifier, argmax, label_at};
use crate::error::{ModelError, Result};
use crate::metrics::ClassificationMetrics;
use crate::tokenizer::SparseFeatures;
use finsent_corpus::{Dataset, Label};
use serde::Serialize;

/// Small labeled set used when no external dataset is given.
pub const BUILTIN_TEST_SET: [(&str, Label); 9] = [
    ("The company reported a significant increase in quarterly profits.", Label::Positive),
    ("Our revenue grew by 25% year-over-year, exceeding all expectations.", Label::Positive),
    ("The new product launch was a resounding success with customers.", Label::Positive),
    ("The firm is facing litigation that could result in substantial fines.", Label::Negative),
    ("A decline in consumer spending has negatively impacted our sales.", Label::Negative),
    ("We have decided to close down our underperforming international division.", Label::Negative),
    ("The board of directors will hold their annual meeting next Tuesday.", Label::Neutral),
    (
        "This report was prepared in accordance with generally accepted accounting principles.",
        Label::Neutral,
    ),
    ("The company's stock price remained unchanged at the close of trading.", Label::Neutral),
];

/// Example filing sentences grouped by expected sentiment.
pub const INFERENCE_EXAMPLES: [(&str, [&str; 3]); 3] = [
    (
        "Positive Examples",
        [
            "Net sales for the third quarter increased by 15% compared to the same period last year, primarily due to strong demand for our new product line.",
            "On June 1, 2025, we completed the acquisition of a leading competitor, which is expected to be accretive to earnings.",
            "We entered into a new credit facility that provides us with increased financial flexibility.",
        ],
    ),
    (
        "Negative Examples",
        [
            "Our operations are subject to intense competition, and we may not be able to compete effectively.",
            "We face significant risks associated with cybersecurity incidents, which could harm our business.",
            "Our operating margin decreased from 25% to 22% due to increased raw material costs and supply chain disruptions.",
        ],
    ),
    (
        "Neutral Examples",
        [
            "The company announced the departure of its Chief Financial Officer, effective immediately.",
            "We anticipate that capital expenditures for the remainder of the year will be approximately $50 million.",
            "The company will hold its annual general meeting on October 25th.",
        ],
    ),
];

/// Predictions and scores for a labeled set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Mean cross-entropy
    pub loss: f64,
    /// Classification scores
    pub metrics: ClassificationMetrics,
    /// Predicted label per row
    #[serde(skip)]
    pub predictions: Vec<Label>,
}

/// Evaluate pre-encoded rows, scoring `batch_size` rows at a time.
pub(crate) fn evaluate_encoded(
    classifier: &SentimentClassifier,
    features: &[SparseFeatures],
    labels: &[Label],
    batch_size: usize,
) -> Result<Evaluation> {
    if features.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(ModelError::DimensionMismatch(format!(
            "{} rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let mut predictions = Vec::with_capacity(features.len());
    let mut loss_sum = 0.0;
    for (batch, batch_labels) in features
        .chunks(batch_size.max(1))
        .zip(labels.chunks(batch_size.max(1)))
    {
        for (x, &y) in batch.iter().zip(batch_labels) {
            let probs = classifier.probabilities(x);
            loss_sum -= probs[y.id()].max(1e-12).ln();
            predictions.push(label_at(argmax(&probs).0));
        }
    }

    Ok(Evaluation {
        loss: loss_sum / features.len() as f64,
        metrics: ClassificationMetrics::compute(labels, &predictions)?,
        predictions,
    })
}

/// Evaluate `classifier` on texts with known labels.
pub fn evaluate<S: AsRef<str>>(
    classifier: &SentimentClassifier,
    texts: &[S],
    labels: &[Label],
) -> Result<Evaluation> {
    let features: Vec<SparseFeatures> = texts.iter().map(|t| classifier.encode(t.as_ref())).collect();
    evaluate_encoded(classifier, &features, labels, features.len())
}

/// Evaluate on every example of `dataset`.
pub fn evaluate_dataset(classifier: &SentimentClassifier, dataset: &Dataset) -> Result<Evaluation> {
    let texts: Vec<&str> = dataset.examples().iter().map(|e| e.text.as_str()).collect();
    let labels: Vec<Label> = dataset.examples().iter().map(|e| e.label).collect();
    evaluate(classifier, &texts, &labels)
}

/// Evaluate on [`BUILTIN_TEST_SET`].
pub fn evaluate_builtin(classifier: &SentimentClassifier) -> Result<Evaluation> {
    let (texts, labels): (Vec<&str>, Vec<Label>) = BUILTIN_TEST_SET.iter().copied().unzip();
    evaluate(classifier, &texts, &labels)
}

/// Prediction for one text of an example category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    /// Category name
    pub category: String,
    /// Input text
    pub text: String,
    /// Model output
    pub prediction: Prediction,
}

/// Run the classifier over `texts` under one category.
pub fn infer<S: AsRef<str>>(classifier: &SentimentClassifier, category: &str, texts: &[S]) -> Vec<InferenceResult> {
    texts
        .iter()
        .map(|text| InferenceResult {
            category: category.to_string(),
            text: text.as_ref().to_string(),
            prediction: classifier.predict(text.as_ref()),
        })
        .collect()
}

/// Run the classifier over [`INFERENCE_EXAMPLES`].
pub fn run_inference_examples(classifier: &SentimentClassifier) -> Vec<InferenceResult> {
    INFERENCE_EXAMPLES
        .iter()
        .flat_map(|(category, texts)| infer(classifier, category, texts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseModel;
    use crate::tokenizer::Vocabulary;
    use approx::assert_abs_diff_eq;

    fn example_loss(classifier: &SentimentClassifier, features: &[(usize, f64)], label: Label) -> f64 {
        -classifier.probabilities(features)[label.id()].max(1e-12).ln()
    }

    #[test]
    fn test_builtin_sets_are_balanced() {
        for label in Label::ALL {
            assert_eq!(BUILTIN_TEST_SET.iter().filter(|(_, l)| *l == label).count(), 3);
        }
        assert_eq!(INFERENCE_EXAMPLES.iter().map(|(_, t)| t.len()).sum::<usize>(), 9);
    }

    #[test]
    fn test_zero_model_loss_is_log_three() {
        let model = SentimentClassifier::zeros(Vocabulary::from_tokens(["a"]), 16, "zero");
        let eval = evaluate_builtin(&model).unwrap();
        assert_abs_diff_eq!(eval.loss, 3f64.ln(), epsilon = 1e-12);
        assert_eq!(eval.predictions, vec![Label::Negative; 9]);
        assert_abs_diff_eq!(eval.metrics.accuracy, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            example_loss(&model, &[], Label::Positive),
            3f64.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_encoded_loss_is_mean_example_loss() {
        let model = BaseModel::Lexicon.initialise(&Vocabulary::default(), 512).unwrap();
        let rows: Vec<SparseFeatures> = ["strong profit growth", "loss and decline"]
            .iter()
            .map(|t| model.encode(t))
            .collect();
        let labels = [Label::Positive, Label::Neutral];

        let eval = evaluate_encoded(&model, &rows, &labels, 1).unwrap();
        let expected = rows
            .iter()
            .zip(labels)
            .map(|(x, y)| example_loss(&model, x, y))
            .sum::<f64>()
            / 2.0;
        assert_abs_diff_eq!(eval.loss, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lexicon_model_on_builtin_set() {
        let model = BaseModel::Lexicon.initialise(&Vocabulary::default(), 512).unwrap();
        let eval = evaluate_builtin(&model).unwrap();
        assert_eq!(eval.predictions[0], Label::Positive);
        assert_eq!(eval.predictions[4], Label::Negative);
        assert!(eval.metrics.accuracy > 1.0 / 3.0);
    }

    #[test]
    fn test_inference_examples() {
        let model = BaseModel::Lexicon.initialise(&Vocabulary::default(), 512).unwrap();
        let results = run_inference_examples(&model);
        assert_eq!(results.len(), 9);
        assert_eq!(results[0].category, "Positive Examples");
        assert!(results.iter().all(|r| r.prediction.confidence >= 1.0 / 3.0));
    }

    #[test]
    fn test_empty_and_mismatched_inputs() {
        let model = SentimentClassifier::zeros(Vocabulary::default(), 16, "zero");
        assert!(matches!(
            evaluate::<&str>(&model, &[], &[]),
            Err(ModelError::EmptyDataset)
        ));
        assert!(matches!(
            evaluate(&model, &["x"], &[]),
            Err(ModelError::DimensionMismatch(_))
        ));
    }
}
