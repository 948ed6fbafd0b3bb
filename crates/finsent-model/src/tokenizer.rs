//! Word tokenizer and vocabulary.
//!
//! Text is lowercased and split on every character that is neither
//! alphanumeric nor an apostrophe. Documents are represented as log-scaled
//! term frequencies (`1 + ln(count)`) normalised to unit L2 length.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default number of tokens kept per document.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Default minimum corpus frequency for a vocabulary entry.
pub const DEFAULT_MIN_FREQ: usize = 2;

/// Default vocabulary size cap.
pub const DEFAULT_MAX_VOCAB_SIZE: usize = 20_000;

/// Sparse document vector as `(vocabulary index, value)` pairs, sorted by index.
pub type SparseFeatures = Vec<(usize, f64)>;

/// Split `text` into at most `max_length` lowercase tokens.
pub fn tokenize(text: &str, max_length: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .take(max_length)
        .map(str::to_string)
        .collect()
}

/// Ordered token vocabulary. Serialises as its token list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(tokens: Vec<String>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.tokens
    }
}

impl Vocabulary {
    /// Vocabulary from a token list. Later duplicates are ignored.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        vocab.extend(tokens);
        vocab
    }

    /// Build from tokenized documents.
    ///
    /// Keeps tokens seen at least `min_freq` times, most frequent first with
    /// ties broken alphabetically, capped at `max_size` entries.
    pub fn build<'a, I>(documents: I, min_freq: usize, max_size: usize) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            for token in doc {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|&(_, count)| count >= min_freq)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_size);

        Self::from_tokens(ranked.into_iter().map(|(token, _)| token))
    }

    /// Append tokens not already present. Returns how many were added.
    pub fn extend<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.tokens.len();
        for token in tokens {
            let token = token.into();
            if !self.index.contains_key(&token) {
                self.index.insert(token.clone(), self.tokens.len());
                self.tokens.push(token);
            }
        }
        self.tokens.len() - before
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of `token`.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Tokens in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Feature vector for a tokenized document.
    ///
    /// Out-of-vocabulary tokens are dropped. A document with no known tokens
    /// yields an empty vector.
    pub fn features(&self, tokens: &[String]) -> SparseFeatures {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for token in tokens {
            if let Some(i) = self.get(token) {
                *counts.entry(i).or_insert(0) += 1;
            }
        }

        let mut features: SparseFeatures = counts
            .into_iter()
            .map(|(i, c)| (i, 1.0 + (c as f64).ln()))
            .collect();
        let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut features {
                *v /= norm;
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Revenue GREW 15%!", vec!["revenue", "grew", "15"])]
    #[case("the company's 'growth'", vec!["the", "company's", "growth"])]
    #[case("risk-adjusted returns", vec!["risk", "adjusted", "returns"])]
    #[case("  ", vec![])]
    fn test_tokenize(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(text, DEFAULT_MAX_LENGTH), expected);
    }

    #[test]
    fn test_tokenize_truncates() {
        assert_eq!(tokenize("a b c d", 2), vec!["a", "b"]);
    }

    #[test]
    fn test_build_orders_and_filters() {
        let docs = [
            tokenize("profit profit loss gain", 10),
            tokenize("profit loss risk", 10),
        ];
        let vocab = Vocabulary::build(docs.iter().map(Vec::as_slice), 2, 10);
        assert_eq!(vocab.tokens(), ["profit", "loss"]);

        let capped = Vocabulary::build(docs.iter().map(Vec::as_slice), 1, 3);
        assert_eq!(capped.tokens(), ["profit", "loss", "gain"]);
    }

    #[test]
    fn test_extend_skips_known_tokens() {
        let mut vocab = Vocabulary::from_tokens(["a", "b"]);
        assert_eq!(vocab.extend(["b", "c", "c"]), 1);
        assert_eq!(vocab.get("c"), Some(2));
    }

    #[test]
    fn test_features_are_normalised() {
        let vocab = Vocabulary::from_tokens(["profit", "loss"]);
        let features = vocab.features(&tokenize("profit profit loss unknown", 10));
        assert_eq!(features.len(), 2);
        let norm: f64 = features.iter().map(|(_, v)| v * v).sum();
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
        assert!(features[0].1 > features[1].1);

        assert!(vocab.features(&tokenize("nothing here", 10)).is_empty());
    }

    #[test]
    fn test_serialises_as_token_list() {
        let vocab = Vocabulary::from_tokens(["x", "y"]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["x","y"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("y"), Some(1));
    }
}
