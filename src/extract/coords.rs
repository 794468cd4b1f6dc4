use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::warn;

use super::{element_text, Coordinates};

static GEO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.geo").unwrap());

/// Coordinate pass: a geo microformat element holding "lat; lon" plain text.
///
/// Anything unexpected (element missing, wrong part count, non-numeric parts)
/// leaves the coordinates unset; it never fails the record.
pub fn extract(doc: &Html) -> Option<Coordinates> {
    let Some(span) = doc.select(&GEO_SEL).next() else {
        warn!("no geo microformat element on page");
        return None;
    };

    let raw = element_text(&span);
    let parts: Vec<&str> = raw.split(';').collect();
    if parts.len() != 2 {
        warn!("geo text is not a lat; lon pair: {:?}", raw);
        return None;
    }

    match (parts[0].trim().parse::<f64>(), parts[1].trim().parse::<f64>()) {
        (Ok(latitude), Ok(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => {
            warn!("geo coordinates failed to parse: {:?}", raw);
            None
        }
    }
}

// ── Tests ──
