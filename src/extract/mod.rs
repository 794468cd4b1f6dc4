pub mod climate_table;
pub mod coords;
pub mod infobox;
pub mod narrative;
pub mod text;

use scraper::{ElementRef, Html};

use crate::db::WeatherRecord;
use self::text::clean_text;

/// Decimal degrees from the geo microformat.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Partial result of the narrative pass.
#[derive(Debug, Default)]
pub struct Narrative {
    pub description: Option<String>,
    pub climate_type: Option<String>,
}

/// Partial result of the infobox pass.
#[derive(Debug, Default)]
pub struct InfoboxFacts {
    pub climate_type: Option<String>,
    pub avg_temperature: Option<f64>,
}

/// Partial result of the climate-table pass.
#[derive(Debug, Default)]
pub struct ClimateTableFacts {
    pub avg_temperature: Option<f64>,
    pub annual_rainfall: Option<f64>,
}

/// Four-pass pipeline over one page: parse once, run every pass against the
/// same tree, merge. Always returns a record, however sparse.
pub fn extract_all(city: &str, html: &str) -> WeatherRecord {
    let doc = Html::parse_document(html);

    let coords = coords::extract(&doc);
    let narrative = narrative::extract(&doc);
    let infobox = infobox::extract(&doc);
    let tables = climate_table::extract(&doc);

    merge(city, coords, narrative, infobox, tables)
}

/// Per-field null-coalescing in pass order. An earlier pass's value is never
/// overwritten by a later one.
fn merge(
    city: &str,
    coords: Option<Coordinates>,
    narrative: Narrative,
    infobox: InfoboxFacts,
    tables: ClimateTableFacts,
) -> WeatherRecord {
    WeatherRecord {
        city_name: city.to_string(),
        latitude: coords.map(|c| c.latitude),
        longitude: coords.map(|c| c.longitude),
        climate_type: narrative.climate_type.or(infobox.climate_type),
        avg_temperature_celsius: infobox.avg_temperature.or(tables.avg_temperature),
        annual_rainfall_mm: tables.annual_rainfall,
        weather_description: narrative.description,
        hottest_month: None,
        coldest_month: None,
    }
}

/// Whole-subtree text of an element, trimmed and NFC-normalized.
pub(crate) fn element_text(el: &ElementRef) -> String {
    clean_text(&el.text().collect::<String>())
}

// ── Tests ──
