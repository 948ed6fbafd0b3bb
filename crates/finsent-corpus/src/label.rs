//! Sentiment labels and example sources.

use crate::error::CorpusError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Three-way sentiment label.
///
/// Ids follow the classifier's output order: negative 0, neutral 1, positive 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Negative sentiment
    Negative,
    /// Neutral or informational
    Neutral,
    /// Positive sentiment
    Positive,
}

impl Label {
    /// All labels in id order.
    pub const ALL: [Self; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Number of classes.
    pub const COUNT: usize = 3;

    /// Class id.
    pub const fn id(&self) -> usize {
        match self {
            Self::Negative => 0,
            Self::Neutral => 1,
            Self::Positive => 2,
        }
    }

    /// Label for a class id.
    pub const fn from_id(id: usize) -> Option<Self> {
        match id {
            0 => Some(Self::Negative),
            1 => Some(Self::Neutral),
            2 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }

    /// Name to id mapping, as stored alongside trained models.
    pub fn mapping() -> BTreeMap<String, usize> {
        Self::ALL.iter().map(|l| (l.as_str().to_string(), l.id())).collect()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Label {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            _ => Err(CorpusError::InvalidLabel(s.to_string())),
        }
    }
}

/// Where a training example came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// SEC EDGAR filing section
    SecFiling,
    /// FRED indicator description
    FredData,
    /// Policy uncertainty context
    PolicyUncertainty,
}

impl Source {
    /// All sources in collection order.
    pub const ALL: [Self; 3] = [Self::SecFiling, Self::FredData, Self::PolicyUncertainty];

    /// Snake case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SecFiling => "sec_filing",
            Self::FredData => "fred_data",
            Self::PolicyUncertainty => "policy_uncertainty",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Source {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sec_filing" => Ok(Self::SecFiling),
            "fred_data" => Ok(Self::FredData),
            "policy_uncertainty" => Ok(Self::PolicyUncertainty),
            _ => Err(CorpusError::InvalidSource(s.to_string())),
        }
    }
}
