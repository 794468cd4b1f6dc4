use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::info;

use super::text::{first_number, round1};
use super::{element_text, ClimateTableFacts};

/// Monthly layout assumption: one label cell followed by at most 12 month
/// columns. Extra trailing columns (annual totals) fall outside the window.
const MAX_MONTH_COLUMNS: usize = 12;

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static CAPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("caption").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

/// Climate-table pass: wide per-month tables of temperature and rainfall.
/// The first matching row across all candidate tables wins per metric.
pub fn extract(doc: &Html) -> ClimateTableFacts {
    let mut facts = ClimateTableFacts::default();
    for table in doc.select(&TABLE_SEL) {
        if !is_candidate(&table) {
            continue;
        }
        scan_table(&table, &mut facts);
    }
    facts
}

/// A table qualifies if it is classed as tabular climate data, captioned with
/// climate/weather, or mentions both temperature and rainfall anywhere.
fn is_candidate(table: &ElementRef) -> bool {
    let classed = table.value().attr("class").is_some_and(|attr| {
        attr.split_whitespace()
            .any(|class| class == "wikitable" || class == "climate-table")
    });
    if classed {
        return true;
    }

    let captioned = table
        .select(&CAPTION_SEL)
        .next()
        .map(|caption| element_text(&caption).to_lowercase())
        .is_some_and(|caption| caption.contains("climate") || caption.contains("weather"));
    if captioned {
        return true;
    }

    let text = table.text().collect::<String>().to_lowercase();
    text.contains("temperature") && text.contains("rainfall")
}

fn scan_table(table: &ElementRef, facts: &mut ClimateTableFacts) {
    for row in table.select(&ROW_SEL) {
        let cells: Vec<ElementRef> = row.select(&CELL_SEL).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = element_text(&cells[0]).to_lowercase();

        if (label.contains("average high") || label.contains("mean maximum"))
            && facts.avg_temperature.is_none()
        {
            let values = monthly_values(&cells);
            if !values.is_empty() {
                let mean = round1(values.iter().sum::<f64>() / values.len() as f64);
                facts.avg_temperature = Some(mean);
                info!("extracted average high temperature: {}°C", mean);
            }
        } else if (label.contains("rainfall") || label.contains("precipitation"))
            && facts.annual_rainfall.is_none()
        {
            let values = monthly_values(&cells);
            if !values.is_empty() {
                let total = round1(values.iter().sum());
                facts.annual_rainfall = Some(total);
                info!("extracted annual rainfall: {}mm", total);
            }
        }
    }
}

/// First number from each of the (at most 12) month cells after the label.
/// Unparseable cells are skipped rather than failing the row.
fn monthly_values(cells: &[ElementRef]) -> Vec<f64> {
    cells
        .iter()
        .skip(1)
        .take(MAX_MONTH_COLUMNS)
        .filter_map(|cell| first_number(&element_text(cell)))
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    fn row(label: &str, cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr><th>{}</th>{}</tr>", label, tds)
    }

    #[test]
    fn average_high_is_mean_of_parseable_cells() {
        let table = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average high °C", &["10", "12", "n/a", "14"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(12.0));
    }

    #[test]
    fn rainfall_is_sum_of_parseable_cells() {
        let table = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average rainfall mm", &["0", "5.5", "10"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.annual_rainfall, Some(15.5));
    }

    #[test]
    fn mean_maximum_and_precipitation_labels_also_match() {
        let table = format!(
            r#"<table class="climate-table"><tbody>{}{}</tbody></table>"#,
            row("Mean maximum °C", &["30", "32"]),
            row("Precipitation mm", &["1.5", "2.5"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(31.0));
        assert_eq!(facts.annual_rainfall, Some(4.0));
    }

    #[test]
    fn caption_alone_qualifies_a_table() {
        let table = format!(
            "<table><caption>Climate data for Sharjah</caption><tbody>{}</tbody></table>",
            row("Average high °C", &["20", "22"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(21.0));
    }

    #[test]
    fn keyword_text_alone_qualifies_a_table() {
        let table = format!(
            "<table><tbody>{}{}</tbody></table>",
            row("Temperature average high", &["20", "24"]),
            row("Rainfall", &["3", "4"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(22.0));
        assert_eq!(facts.annual_rainfall, Some(7.0));
    }

    #[test]
    fn unqualified_table_is_ignored() {
        // no class, no caption, lacks the rainfall keyword
        let table = format!(
            "<table><tbody>{}</tbody></table>",
            row("Average high", &["20", "24"])
        );
        let facts = extract(&doc(&table));
        assert!(facts.avg_temperature.is_none());
    }

    #[test]
    fn only_first_twelve_month_columns_count() {
        // 12 monthly values of 1.0 plus a 13th annual-total column
        let mut cells = vec!["1.0"; 12];
        cells.push("999");
        let table = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Rainfall mm", &cells)
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.annual_rainfall, Some(12.0));
    }

    #[test]
    fn first_matching_row_wins() {
        let table = format!(
            r#"<table class="wikitable"><tbody>{}{}</tbody></table>"#,
            row("Average high °C", &["10", "20"]),
            row("Record average high °C", &["40", "44"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(15.0));
    }

    #[test]
    fn first_matching_table_wins() {
        let first = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average high °C", &["10"])
        );
        let second = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average high °C", &["30"])
        );
        let facts = extract(&doc(&format!("{}{}", first, second)));
        assert_eq!(facts.avg_temperature, Some(10.0));
    }

    #[test]
    fn row_of_unparseable_cells_sets_nothing() {
        let table = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average high °C", &["n/a", "trace", "-"])
        );
        let facts = extract(&doc(&table));
        assert!(facts.avg_temperature.is_none());
    }

    #[test]
    fn wide_cells_with_parenthesised_units() {
        let table = format!(
            r#"<table class="wikitable"><tbody>{}</tbody></table>"#,
            row("Average high °C (°F)", &["24.0 (75.2)", "26.0 (78.8)"])
        );
        let facts = extract(&doc(&table));
        assert_eq!(facts.avg_temperature, Some(25.0));
    }
}
