//! Text normalization shared by index builds and queries.
//!
//! Both sides must produce term-for-term comparable output, so every step is
//! a pure function of the input with no locale or clock dependence.

use regex::Regex;
use std::sync::LazyLock;

use crate::analyzer;

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex literal"));
static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex literal"));
static PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex literal"));
static URLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:http|ftp)s?://\S+").expect("valid regex literal"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex literal"));

/// Strip markup, annotations, URLs, punctuation and digits, then lowercase.
///
/// Order matters: URLs go before punctuation removal, which would otherwise
/// break them into ordinary words.
pub fn clean(text: &str) -> String {
    let text = TAGS.replace_all(text, "");
    let text = BRACKETS.replace_all(&text, "");
    let text = PARENS.replace_all(&text, "");
    let text = URLS.replace_all(&text, "");
    let text: String = text.chars().map(|c| if c.is_alphanumeric() { c } else { ' ' }).collect();
    let text = DIGITS.replace_all(&text, "");
    text.to_lowercase()
}

/// The token sequence every lexical model is built on.
pub fn normalize(text: &str) -> Vec<String> {
    analyzer::word_tokens(&clean(text))
}

/// [`normalize`] followed by English stop-word removal.
pub fn content_terms(text: &str) -> Vec<String> {
    analyzer::content_tokens(&clean(text))
}
