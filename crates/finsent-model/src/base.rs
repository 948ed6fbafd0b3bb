//! Base models that fine-tuning starts from.

use crate::checkpoint::{is_checkpoint_dir, load_model};
use crate::classifier::SentimentClassifier;
use crate::error::{ModelError, Result};
use crate::tokenizer::Vocabulary;
use finsent_corpus::{Label, keyword_polarity};
use finsent_corpus::sentiment::{NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS};
use ndarray::{Array1, Array2};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifier of the built-in lexicon base model.
pub const LEXICON_BASE_MODEL: &str = "builtin:finance-lexicon";

/// Weight the lexicon assigns a keyword towards its polarity.
pub const LEXICON_PRIOR: f64 = 1.0;

/// Starting point for fine-tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseModel {
    /// Zero model with a prior over the sentiment keywords
    Lexicon,
    /// Previously saved checkpoint directory
    Checkpoint(PathBuf),
}

impl BaseModel {
    /// Identifier recorded in saved models.
    pub fn name(&self) -> String {
        match self {
            Self::Lexicon => LEXICON_BASE_MODEL.to_string(),
            Self::Checkpoint(path) => path.display().to_string(),
        }
    }

    /// Initial classifier over the base vocabulary followed by `corpus_vocab`.
    ///
    /// Tokens new to the base model start at zero weight.
    pub fn initialise(&self, corpus_vocab: &Vocabulary, max_length: usize) -> Result<SentimentClassifier> {
        match self {
            Self::Lexicon => lexicon_classifier(corpus_vocab, max_length),
            Self::Checkpoint(dir) => {
                let base = load_model(dir)?;
                extend_classifier(&base, corpus_vocab, max_length, &self.name())
            }
        }
    }
}

impl FromStr for BaseModel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == LEXICON_BASE_MODEL {
            return Ok(Self::Lexicon);
        }
        let path = PathBuf::from(s);
        if is_checkpoint_dir(&path) {
            Ok(Self::Checkpoint(path))
        } else {
            Err(ModelError::InvalidArgs(format!(
                "unknown base model '{s}': expected '{LEXICON_BASE_MODEL}' or a checkpoint directory"
            )))
        }
    }
}

impl fmt::Display for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn lexicon_classifier(corpus_vocab: &Vocabulary, max_length: usize) -> Result<SentimentClassifier> {
    let mut vocab = Vocabulary::from_tokens(POSITIVE_KEYWORDS.iter().chain(&NEGATIVE_KEYWORDS).copied());
    vocab.extend(corpus_vocab.tokens().iter().cloned());

    let mut weights = Array2::zeros((Label::COUNT, vocab.len()));
    for (j, token) in vocab.tokens().iter().enumerate() {
        let (toward, away) = match keyword_polarity(token) {
            Some(Label::Positive) => (Label::Positive, Label::Negative),
            Some(Label::Negative) => (Label::Negative, Label::Positive),
            _ => continue,
        };
        weights[[toward.id(), j]] = LEXICON_PRIOR;
        weights[[away.id(), j]] = -LEXICON_PRIOR;
    }

    let bias = Array1::zeros(Label::COUNT);
    SentimentClassifier::new(vocab, weights, bias, max_length, LEXICON_BASE_MODEL)
}

fn extend_classifier(
    base: &SentimentClassifier,
    corpus_vocab: &Vocabulary,
    max_length: usize,
    name: &str,
) -> Result<SentimentClassifier> {
    let mut vocab = base.vocabulary().clone();
    let added = vocab.extend(corpus_vocab.tokens().iter().cloned());

    let known = base.vocabulary().len();
    let mut weights = Array2::zeros((Label::COUNT, vocab.len()));
    weights
        .slice_mut(ndarray::s![.., ..known])
        .assign(base.weights());

    tracing::info!(base = name, known, added, "extending base model vocabulary");
    SentimentClassifier::new(vocab, weights, base.bias().clone(), max_length, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::save_model;
    use ndarray::array;

    #[test]
    fn test_parse_base_model() {
        assert_eq!(LEXICON_BASE_MODEL.parse::<BaseModel>().unwrap(), BaseModel::Lexicon);
        assert!(matches!(
            "ProsusAI/finbert".parse::<BaseModel>(),
            Err(ModelError::InvalidArgs(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let classifier = SentimentClassifier::zeros(Vocabulary::from_tokens(["a"]), 8, "x");
        save_model(&classifier, "m", dir.path()).unwrap();
        let parsed: BaseModel = dir.path().to_str().unwrap().parse().unwrap();
        assert_eq!(parsed, BaseModel::Checkpoint(dir.path().to_path_buf()));
    }

    #[test]
    fn test_lexicon_prior() {
        let corpus = Vocabulary::from_tokens(["board", "profit"]);
        let model = BaseModel::Lexicon.initialise(&corpus, 32).unwrap();
        let vocab = model.vocabulary();
        assert_eq!(vocab.len(), POSITIVE_KEYWORDS.len() + NEGATIVE_KEYWORDS.len() + 1);

        let profit = vocab.get("profit").unwrap();
        assert_eq!(model.weights()[[Label::Positive.id(), profit]], LEXICON_PRIOR);
        assert_eq!(model.weights()[[Label::Negative.id(), profit]], -LEXICON_PRIOR);
        let board = vocab.get("board").unwrap();
        assert_eq!(model.weights().column(board).sum(), 0.0);

        assert_eq!(model.predict("profit growth").label, Label::Positive);
        assert_eq!(model.predict("loss and decline").label, Label::Negative);
    }

    #[test]
    fn test_checkpoint_continuation_keeps_weights() {
        let dir = tempfile::tempdir().unwrap();
        let base = SentimentClassifier::new(
            Vocabulary::from_tokens(["loss", "profit"]),
            array![[1.0, -1.0], [0.0, 0.0], [-1.0, 1.0]],
            array![0.0, 0.5, 0.0],
            64,
            LEXICON_BASE_MODEL,
        )
        .unwrap();
        save_model(&base, "prev", dir.path()).unwrap();

        let corpus = Vocabulary::from_tokens(["profit", "merger"]);
        let model = BaseModel::Checkpoint(dir.path().to_path_buf())
            .initialise(&corpus, 128)
            .unwrap();
        assert_eq!(model.vocabulary().tokens(), ["loss", "profit", "merger"]);
        assert_eq!(model.weights()[[2, 1]], 1.0);
        assert_eq!(model.weights().column(2).sum(), 0.0);
        assert_eq!(model.bias()[1], 0.5);
        assert_eq!(model.max_length(), 128);
    }
}
