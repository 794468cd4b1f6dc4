use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::text::{clean_text, truncate_chars};
use super::{element_text, Narrative};

const MAX_DESCRIPTION_CHARS: usize = 500;

static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3").unwrap());
static CLIMATE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)climate|weather").unwrap());

/// Keywords checked against the section prose, highest priority first.
const CLIMATE_KEYWORDS: &[(&str, &str)] = &[
    ("desert", "Desert"),
    ("arid", "Arid"),
    ("subtropical", "Subtropical"),
];

/// Narrative pass: prose under the first Climate/Weather heading that has any.
pub fn extract(doc: &Html) -> Narrative {
    for heading in doc.select(&HEADING_SEL) {
        if !CLIMATE_HEADING_RE.is_match(&element_text(&heading)) {
            continue;
        }
        let prose = following_paragraphs(&heading);
        if prose.is_empty() {
            continue;
        }
        return Narrative {
            // classification sees the full text, truncation happens after
            climate_type: classify(&prose),
            description: Some(truncate_chars(&prose, MAX_DESCRIPTION_CHARS)),
        };
    }
    Narrative::default()
}

/// Concatenated `<p>` text from the heading's following siblings, stopping at
/// the next heading. Non-paragraph siblings are skipped, not terminal.
fn following_paragraphs(heading: &ElementRef) -> String {
    let mut prose = String::new();
    for sibling in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(sibling) else {
            continue;
        };
        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" => break,
            "p" => {
                prose.push_str(&el.text().collect::<String>());
                prose.push(' ');
            }
            _ => {}
        }
    }
    clean_text(&prose)
}

fn classify(prose: &str) -> Option<String> {
    let lower = prose.to_lowercase();
    CLIMATE_KEYWORDS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| (*label).to_string())
}

// ── Tests ──
