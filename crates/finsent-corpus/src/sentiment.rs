//! Keyword-based weak labels for filing text.

use crate::label::Label;

/// Words that push a filing towards a positive label.
pub const POSITIVE_KEYWORDS: [&str; 14] = [
    "increase",
    "growth",
    "improve",
    "positive",
    "strong",
    "profit",
    "revenue",
    "success",
    "gain",
    "up",
    "higher",
    "better",
    "excellent",
    "outperform",
];

/// Words that push a filing towards a negative label.
pub const NEGATIVE_KEYWORDS: [&str; 13] = [
    "decrease",
    "decline",
    "loss",
    "negative",
    "weak",
    "risk",
    "challenge",
    "down",
    "lower",
    "worse",
    "poor",
    "underperform",
    "volatility",
];

const SUFFIXES: [&str; 6] = ["s", "es", "d", "ed", "ing", "ly"];

/// Number of distinct keywords of each polarity found in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    /// Distinct positive keywords present
    pub positive: usize,
    /// Distinct negative keywords present
    pub negative: usize,
}

/// Whether vocabulary `token` is `keyword` or a simple inflection of it.
fn matches_keyword(token: &str, keyword: &str) -> bool {
    if token == keyword {
        return true;
    }
    if let Some(rest) = token.strip_prefix(keyword)
        && SUFFIXES.contains(&rest)
    {
        return true;
    }
    // improve -> improving, decline -> declining
    if let Some(stem) = keyword.strip_suffix('e')
        && let Some(rest) = token.strip_prefix(stem)
    {
        return rest == "ing";
    }
    false
}

fn distinct_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

/// Count distinct keywords contained in the lowercased text.
///
/// Matching is by substring, so "up" is found in "supply" and "gain" in
/// "again". Each keyword counts once however often it appears.
pub fn count_keywords(text: &str) -> KeywordCounts {
    let lower = text.to_lowercase();
    KeywordCounts {
        positive: distinct_hits(&lower, &POSITIVE_KEYWORDS),
        negative: distinct_hits(&lower, &NEGATIVE_KEYWORDS),
    }
}

/// Label from keyword counts, by form type.
///
/// Annual reports are informational and always neutral. Quarterly reports
/// need a margin of more than two keywords; current reports follow the sign
/// of the difference. Any other form is neutral.
pub fn label_for_form(form: &str, counts: KeywordCounts) -> Label {
    let (pos, neg) = (counts.positive, counts.negative);
    match form {
        "10-Q" => {
            if pos > neg + 2 {
                Label::Positive
            } else if neg > pos + 2 {
                Label::Negative
            } else {
                Label::Neutral
            }
        }
        "8-K" => {
            if pos > neg {
                Label::Positive
            } else if neg > pos {
                Label::Negative
            } else {
                Label::Neutral
            }
        }
        _ => Label::Neutral,
    }
}

/// Polarity of a single token, if it is a sentiment keyword.
pub fn keyword_polarity(token: &str) -> Option<Label> {
    if POSITIVE_KEYWORDS.iter().any(|kw| matches_keyword(token, kw)) {
        Some(Label::Positive)
    } else if NEGATIVE_KEYWORDS.iter().any(|kw| matches_keyword(token, kw)) {
        Some(Label::Negative)
    } else {
        None
    }
}

/// Label a cleaned filing text.
pub fn label_filing_text(text: &str, form: &str) -> Label {
    label_for_form(form, count_keywords(text))
}
