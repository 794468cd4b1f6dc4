use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").unwrap());

/// First decimal number appearing in `text`, if any.
///
/// Range cells like "20–25" yield the lower bound; that is the contract the
/// table heuristics rely on.
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER_RE.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Trim surrounding whitespace and normalize to NFC. Every piece of extracted
/// text goes through here before it is stored or matched.
pub fn clean_text(text: &str) -> String {
    text.trim().nfc().collect()
}

/// At most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ── Tests ──
