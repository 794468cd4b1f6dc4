use anyhow::Result;
use rusqlite::Connection;

const DB_PATH: &str = "data/weather.sqlite";

/// One extraction result per (city, run). Optional fields stay `None` when no
/// extractor produced a value; `None` is distinct from an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRecord {
    pub city_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub climate_type: Option<String>,
    pub avg_temperature_celsius: Option<f64>,
    pub annual_rainfall_mm: Option<f64>,
    pub weather_description: Option<String>,
    // Reserved. No extractor fills these yet.
    pub hottest_month: Option<String>,
    pub coldest_month: Option<String>,
}

/// Current conditions from the weather API. Independent of [`WeatherRecord`].
#[derive(Debug, Clone)]
pub struct CurrentConditions {
    pub city_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub condition: String,
    pub wind_speed: f64,
    pub visibility_m: f64,
    pub observed_at: String,
}

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS weather_data (
            id                      INTEGER PRIMARY KEY,
            city_name               TEXT NOT NULL,
            latitude                REAL,
            longitude               REAL,
            climate_type            TEXT,
            avg_temperature_celsius REAL,
            avg_humidity_percent    REAL,
            annual_rainfall_mm      REAL,
            hottest_month           TEXT,
            coldest_month           TEXT,
            weather_description     TEXT,
            data_source             TEXT NOT NULL DEFAULT 'Wikipedia',
            extracted_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_weather_city_day
            ON weather_data(city_name, date(extracted_at));

        CREATE TABLE IF NOT EXISTS current_weather (
            id           INTEGER PRIMARY KEY,
            city_name    TEXT NOT NULL,
            temperature  REAL,
            humidity     REAL,
            pressure     REAL,
            condition    TEXT,
            wind_speed   REAL,
            visibility_m REAL,
            data_source  TEXT NOT NULL DEFAULT 'OpenWeatherMap',
            observed_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_current_city ON current_weather(city_name);
        ",
    )?;
    Ok(())
}

// ── Extracted records ──

/// Persist one record. A same-day re-run replaces the earlier row (the table
/// is unique per city per day).
pub fn save_record(conn: &Connection, record: &WeatherRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO weather_data
         (city_name, latitude, longitude, climate_type, avg_temperature_celsius,
          annual_rainfall_mm, hottest_month, coldest_month, weather_description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            record.city_name,
            record.latitude,
            record.longitude,
            record.climate_type,
            record.avg_temperature_celsius,
            record.annual_rainfall_mm,
            record.hottest_month,
            record.coldest_month,
            record.weather_description,
        ],
    )?;
    Ok(())
}

pub struct RecordRow {
    pub record: WeatherRecord,
    pub data_source: String,
    pub extracted_at: String,
}

const RECORD_COLUMNS: &str = "city_name, latitude, longitude, climate_type, \
     avg_temperature_celsius, annual_rainfall_mm, hottest_month, coldest_month, \
     weather_description, data_source, extracted_at";

fn read_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        record: WeatherRecord {
            city_name: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
            climate_type: row.get(3)?,
            avg_temperature_celsius: row.get(4)?,
            annual_rainfall_mm: row.get(5)?,
            hottest_month: row.get(6)?,
            coldest_month: row.get(7)?,
            weather_description: row.get(8)?,
        },
        data_source: row.get(9)?,
        extracted_at: row.get(10)?,
    })
}

/// Stored records, newest first per city; with `city`, that city's history only.
pub fn fetch_records(conn: &Connection, city: Option<&str>) -> Result<Vec<RecordRow>> {
    match city {
        Some(name) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM weather_data WHERE city_name = ?1 ORDER BY extracted_at DESC",
                RECORD_COLUMNS
            ))?;
            let rows = stmt
                .query_map([name], |row| read_record_row(row))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM weather_data ORDER BY city_name, extracted_at DESC",
                RECORD_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], |row| read_record_row(row))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
    }
}

/// Latest record per city, for the summary table and CSV export.
pub fn fetch_latest(conn: &Connection) -> Result<Vec<RecordRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM weather_data wd
         WHERE extracted_at = (SELECT MAX(extracted_at) FROM weather_data
                               WHERE city_name = wd.city_name)
         ORDER BY city_name",
        RECORD_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], |row| read_record_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Current conditions ──

pub fn save_current(conn: &Connection, conditions: &CurrentConditions) -> Result<()> {
    conn.execute(
        "INSERT INTO current_weather
         (city_name, temperature, humidity, pressure, condition, wind_speed,
          visibility_m, observed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            conditions.city_name,
            conditions.temperature,
            conditions.humidity,
            conditions.pressure,
            conditions.condition,
            conditions.wind_speed,
            conditions.visibility_m,
            conditions.observed_at,
        ],
    )?;
    Ok(())
}

// ── Stats ──

pub struct Stats {
    pub cities: usize,
    pub records: usize,
    pub api_records: usize,
    pub last_extracted: Option<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let cities: usize = conn.query_row(
        "SELECT COUNT(DISTINCT city_name) FROM weather_data",
        [],
        |r| r.get(0),
    )?;
    let records: usize = conn.query_row("SELECT COUNT(*) FROM weather_data", [], |r| r.get(0))?;
    let api_records: usize =
        conn.query_row("SELECT COUNT(*) FROM current_weather", [], |r| r.get(0))?;
    let last_extracted: Option<String> =
        conn.query_row("SELECT MAX(extracted_at) FROM weather_data", [], |r| {
            r.get(0)
        })?;
    Ok(Stats {
        cities,
        records,
        api_records,
        last_extracted,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn dubai() -> WeatherRecord {
        WeatherRecord {
            city_name: "Dubai".into(),
            latitude: Some(25.2048),
            longitude: Some(55.2708),
            climate_type: Some("Desert".into()),
            avg_temperature_celsius: Some(27.0),
            annual_rainfall_mm: Some(94.3),
            weather_description: Some("Hot desert climate.".into()),
            ..Default::default()
        }
    }

    #[test]
    fn save_and_fetch_roundtrip() {
        let conn = test_conn();
        save_record(&conn, &dubai()).unwrap();

        let rows = fetch_records(&conn, Some("Dubai")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record, dubai());
        assert_eq!(rows[0].data_source, "Wikipedia");
        assert!(!rows[0].extracted_at.is_empty());
    }

    #[test]
    fn unset_fields_come_back_as_none() {
        let conn = test_conn();
        let record = WeatherRecord {
            city_name: "Fujairah".into(),
            ..Default::default()
        };
        save_record(&conn, &record).unwrap();

        let rows = fetch_records(&conn, Some("Fujairah")).unwrap();
        assert_eq!(rows[0].record, record);
        assert!(rows[0].record.climate_type.is_none());
        assert!(rows[0].record.avg_temperature_celsius.is_none());
    }

    #[test]
    fn same_day_rerun_replaces_row() {
        let conn = test_conn();
        save_record(&conn, &dubai()).unwrap();
        let mut updated = dubai();
        updated.avg_temperature_celsius = Some(28.1);
        save_record(&conn, &updated).unwrap();

        let rows = fetch_records(&conn, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.avg_temperature_celsius, Some(28.1));
    }

    #[test]
    fn latest_is_one_row_per_city() {
        let conn = test_conn();
        save_record(&conn, &dubai()).unwrap();
        save_record(
            &conn,
            &WeatherRecord {
                city_name: "Ajman".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let rows = fetch_latest(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record.city_name, "Ajman");
        assert_eq!(rows[1].record.city_name, "Dubai");
    }

    #[test]
    fn current_conditions_and_stats() {
        let conn = test_conn();
        save_record(&conn, &dubai()).unwrap();
        save_current(
            &conn,
            &CurrentConditions {
                city_name: "Dubai".into(),
                temperature: 39.5,
                humidity: 41.0,
                pressure: 998.0,
                condition: "clear sky".into(),
                wind_speed: 4.6,
                visibility_m: 10000.0,
                observed_at: "2024-06-01T12:00:00Z".into(),
            },
        )
        .unwrap();

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.cities, 1);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.api_records, 1);
        assert!(stats.last_extracted.is_some());
    }

    #[test]
    fn stats_on_empty_database() {
        let conn = test_conn();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.records, 0);
        assert!(stats.last_extracted.is_none());
    }
}
