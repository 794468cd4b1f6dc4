use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::db;

const HEADER: &[&str] = &[
    "city_name",
    "latitude",
    "longitude",
    "climate_type",
    "avg_temperature_celsius",
    "annual_rainfall_mm",
    "hottest_month",
    "coldest_month",
    "weather_description",
    "data_source",
    "extracted_at",
];

/// Latest record per city as a flat CSV for offline analysis. Unset fields
/// become empty columns.
pub fn write_csv(conn: &Connection, path: &Path) -> Result<usize> {
    let rows = db::fetch_latest(conn)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;
    for row in &rows {
        let r = &row.record;
        writer.write_record([
            r.city_name.clone(),
            opt_num(r.latitude),
            opt_num(r.longitude),
            r.climate_type.clone().unwrap_or_default(),
            opt_num(r.avg_temperature_celsius),
            opt_num(r.annual_rainfall_mm),
            r.hottest_month.clone().unwrap_or_default(),
            r.coldest_month.clone().unwrap_or_default(),
            r.weather_description.clone().unwrap_or_default(),
            row.data_source.clone(),
            row.extracted_at.clone(),
        ])?;
    }
    writer.flush()?;

    Ok(rows.len())
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WeatherRecord;

    #[test]
    fn one_row_per_city_with_empty_unset_columns() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        db::save_record(
            &conn,
            &WeatherRecord {
                city_name: "Dubai".into(),
                avg_temperature_celsius: Some(27.0),
                climate_type: Some("Desert".into()),
                ..Default::default()
            },
        )
        .unwrap();
        db::save_record(
            &conn,
            &WeatherRecord {
                city_name: "Ajman".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let count = write_csv(&conn, &path).unwrap();
        assert_eq!(count, 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        assert!(lines.next().unwrap().starts_with("city_name,latitude"));
        let ajman = lines.next().unwrap();
        let dubai = lines.next().unwrap();
        assert!(ajman.starts_with("Ajman,,,"));
        assert!(dubai.contains("Dubai"));
        assert!(dubai.contains("Desert"));
        assert!(dubai.contains("27"));
        assert!(lines.next().is_none());
    }
}
