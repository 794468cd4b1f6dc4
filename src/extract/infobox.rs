use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::warn;

use super::text::{first_number, truncate_chars};
use super::{element_text, InfoboxFacts};

const MAX_CLIMATE_SNIPPET_CHARS: usize = 50;

static INFOBOX_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.infobox").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static DATA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Infobox pass: the page's key/value summary table.
///
/// A row's label decides what its data cell contributes: "climate" rows give
/// a raw climate snippet, "temperature" rows give the first number. The first
/// matching row of each kind wins within this pass.
pub fn extract(doc: &Html) -> InfoboxFacts {
    let mut facts = InfoboxFacts::default();

    let Some(infobox) = doc.select(&INFOBOX_SEL).next() else {
        warn!("no infobox table on page");
        return facts;
    };

    for row in infobox.select(&ROW_SEL) {
        let (Some(label_cell), Some(data_cell)) =
            (row.select(&LABEL_SEL).next(), row.select(&DATA_SEL).next())
        else {
            continue;
        };

        let label = element_text(&label_cell).to_lowercase();
        if label.contains("climate") && facts.climate_type.is_none() {
            facts.climate_type = Some(truncate_chars(
                &element_text(&data_cell),
                MAX_CLIMATE_SNIPPET_CHARS,
            ));
        } else if label.contains("temperature") && facts.avg_temperature.is_none() {
            if let Some(value) = first_number(&element_text(&data_cell)) {
                facts.avg_temperature = Some(value);
            }
        }
    }

    facts
}

// ── Tests ──
