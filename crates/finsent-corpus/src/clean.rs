//! Text normalisation.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of characters kept by [`clean_text`].
pub const MAX_TEXT_CHARS: usize = 5000;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?;:\-()\[\]{}]").expect("valid regex"));

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").expect("valid regex")
});
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(br|p|div|tr|li|table|h[1-6]|title)\b[^>]*>").expect("valid regex")
});
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid regex"));
static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}\r\f\v]+").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid regex"));

/// Normalise text for training.
///
/// Tags are stripped, characters outside word characters, whitespace and
/// `.,!?;:-()[]{}` become spaces, whitespace runs collapse to one space and
/// the result is cut to [`MAX_TEXT_CHARS`] characters followed by `...`.
///
/// Tags go first: the character filter turns `<` and `>` into spaces, after
/// which tag names would survive as words. Whitespace collapses last so the
/// spaces left by the filter do not pile up.
///
/// ```
/// use finsent_corpus::clean_text;
///
/// assert_eq!(clean_text("  Net   <b>sales</b> rose $5\n\n"), "Net sales rose 5");
/// ```
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = TAG.replace_all(text, "");
    let text = DISALLOWED.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");

    let text = if text.chars().count() > MAX_TEXT_CHARS {
        let mut truncated: String = text.chars().take(MAX_TEXT_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.into_owned()
    };

    text.trim().to_string()
}

/// Convert an HTML document to plain text, keeping block structure as newlines.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(html, " ");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = INLINE_SPACE.replace_all(&text, " ");

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = lines.join("\n");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}

/// Decode the entities that show up in EDGAR HTML.
fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&amp;", "&");

    NUMERIC_ENTITY
        .replace_all(&named, |caps: &regex::Captures<'_>| {
            let code = &caps[1];
            let value = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            match value.and_then(char::from_u32) {
                Some('\u{a0}') => " ".to_string(),
                Some(c) => c.to_string(),
                None => String::new(),
            }
        })
        .into_owned()
}
