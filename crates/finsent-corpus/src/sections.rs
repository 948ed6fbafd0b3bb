//! Section extraction from SEC filings.
//!
//! Filings repeat every item heading in the table of contents, so each
//! heading can match several times. Every match opens a candidate span that
//! runs to the next closing heading; the longest candidate wins, which skips
//! the short table-of-contents spans.

use crate::clean::html_to_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Candidate spans shorter than this are treated as table-of-contents noise.
pub const MIN_SECTION_CHARS: usize = 200;

/// Kind of extracted section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Item 1A, Risk Factors
    RiskFactors,
    /// Management's Discussion and Analysis
    Mdna,
    /// Whole document, used when no known section is found
    FullText,
}

impl SectionKind {
    /// Snake case name, stored in example metadata.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RiskFactors => "risk_factors",
            Self::Mdna => "mdna",
            Self::FullText => "full_text",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section of filing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Which section this is
    pub kind: SectionKind,
    /// Plain text, heading included
    pub text: String,
}

struct SectionPattern {
    start: Regex,
    end: Regex,
}

impl SectionPattern {
    fn new(start: &str, end: &str) -> Self {
        Self {
            start: Regex::new(start).expect("valid regex"),
            end: Regex::new(end).expect("valid regex"),
        }
    }

    /// Longest span from a start heading to the next end heading.
    fn longest_span<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.start
            .find_iter(text)
            .map(|start| {
                let rest = &text[start.end()..];
                let end = self
                    .end
                    .find(rest)
                    .map_or(text.len(), |m| start.end() + m.start());
                text[start.start()..end].trim()
            })
            .filter(|span| span.chars().count() >= MIN_SECTION_CHARS)
            .max_by_key(|span| span.len())
    }
}

static RISK_FACTORS: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"(?i)item\s*1a\b\.?[\s\-:.]*risk\s+factors",
        r"(?i)item\s*(1b|2|3)\b",
    )
});

static MDNA_ANNUAL: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"(?i)item\s*7\b\.?[\s\-:.]*management.s\s+discussion",
        r"(?i)item\s*(7a|8)\b",
    )
});

static MDNA_QUARTERLY: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"(?i)item\s*2\b\.?[\s\-:.]*management.s\s+discussion",
        r"(?i)item\s*(3|4)\b",
    )
});

/// Whether the document looks like HTML rather than plain text.
fn looks_like_html(raw: &str) -> bool {
    let head: String = raw.chars().take(2048).collect::<String>().to_lowercase();
    head.contains("<html") || head.contains("<div") || head.contains("<p") || head.contains("<?xml")
}

/// Extract Risk Factors and MD&A from a filing.
///
/// `form` selects the MD&A item: Item 7 for annual reports, Item 2 for
/// quarterly ones. Forms without those items (8-K and friends) and filings
/// where nothing matches yield a single [`SectionKind::FullText`] section.
pub fn extract_sections(raw: &str, form: &str) -> Vec<Section> {
    let text = if looks_like_html(raw) {
        html_to_text(raw)
    } else {
        raw.to_string()
    };

    let base_form = form.split('/').next().unwrap_or(form);
    let mdna = match base_form {
        "10-K" => Some(&*MDNA_ANNUAL),
        "10-Q" => Some(&*MDNA_QUARTERLY),
        _ => None,
    };

    let mut sections = Vec::new();
    if matches!(base_form, "10-K" | "10-Q")
        && let Some(span) = RISK_FACTORS.longest_span(&text)
    {
        sections.push(Section {
            kind: SectionKind::RiskFactors,
            text: span.to_string(),
        });
    }
    if let Some(pattern) = mdna
        && let Some(span) = pattern.longest_span(&text)
    {
        sections.push(Section {
            kind: SectionKind::Mdna,
            text: span.to_string(),
        });
    }

    if sections.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            sections.push(Section {
                kind: SectionKind::FullText,
                text: trimmed.to_string(),
            });
        }
    }

    tracing::debug!(form, sections = sections.len(), "extracted filing sections");
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(word: &str) -> String {
        format!("{} ", word).repeat(60)
    }

    fn annual_report() -> String {
        format!(
            "Table of Contents\n\
             Item 1A. Risk Factors 12\n\
             Item 1B. Unresolved Staff Comments 20\n\
             Item 7. Management's Discussion and Analysis 30\n\
             Item 7A. Quantitative and Qualitative Disclosures 40\n\
             PART I\n\
             Item 1A. Risk Factors\n{}\n\
             Item 1B. Unresolved Staff Comments\nNone.\n\
             Item 7. Management\u{2019}s Discussion and Analysis of Financial Condition\n{}\n\
             Item 7A. Quantitative and Qualitative Disclosures About Market Risk\n{}\n\
             Item 8. Financial Statements\n",
            filler("competition"),
            filler("revenue"),
            filler("rates"),
        )
    }

    #[test]
    fn test_annual_sections_skip_table_of_contents() {
        let sections = extract_sections(&annual_report(), "10-K");
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].kind, SectionKind::RiskFactors);
        assert!(sections[0].text.starts_with("Item 1A. Risk Factors"));
        assert!(sections[0].text.contains("competition"));
        assert!(!sections[0].text.contains("Unresolved"));

        assert_eq!(sections[1].kind, SectionKind::Mdna);
        assert!(sections[1].text.contains("revenue"));
        assert!(!sections[1].text.contains("rates"));
    }

    #[test]
    fn test_quarterly_mdna_is_item_2() {
        let doc = format!(
            "PART I\nItem 2. Management's Discussion and Analysis\n{}\n\
             Item 3. Quantitative and Qualitative Disclosures\nsmall\n\
             PART II\nItem 1A. Risk Factors\n{}\nItem 2. Unregistered Sales\n",
            filler("margin"),
            filler("cyber"),
        );
        let sections = extract_sections(&doc, "10-Q");
        let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::RiskFactors, SectionKind::Mdna]);
        assert!(sections[0].text.contains("cyber"));
        assert!(!sections[0].text.contains("Unregistered"));
        assert!(sections[1].text.contains("margin"));
    }

    #[test]
    fn test_current_report_falls_back_to_full_text() {
        let doc = "Item 2.02 Results of Operations and Financial Condition. Revenue was up.";
        let sections = extract_sections(doc, "8-K");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::FullText);
        assert_eq!(sections[0].text, doc);
    }

    #[test]
    fn test_toc_only_falls_back_to_full_text() {
        let doc = "Item 1A. Risk Factors 12\nItem 1B. Unresolved Staff Comments 20\n";
        let sections = extract_sections(doc, "10-K");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::FullText);
    }

    #[test]
    fn test_html_input() {
        let html = format!(
            "<html><body><p>Item 1A.&nbsp;Risk Factors</p><div>{}</div><p>Item 2. Properties</p></body></html>",
            filler("litigation")
        );
        let sections = extract_sections(&html, "10-K/A");
        assert_eq!(sections[0].kind, SectionKind::RiskFactors);
        assert!(!sections[0].text.contains('<'));
        assert!(sections[0].text.contains("litigation"));
    }

    #[test]
    fn test_empty_document() {
        assert!(extract_sections("   ", "10-K").is_empty());
    }
}
