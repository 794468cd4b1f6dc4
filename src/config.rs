use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// One configured entity: where its encyclopedia page lives and which
/// coordinates the current-weather API should query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Built-in default list: the seven UAE cities.
pub fn default_cities() -> Vec<City> {
    [
        ("Abu Dhabi", "https://en.wikipedia.org/wiki/Abu_Dhabi", 24.2992, 54.6969),
        ("Dubai", "https://en.wikipedia.org/wiki/Dubai", 25.2048, 55.2708),
        ("Sharjah", "https://en.wikipedia.org/wiki/Sharjah", 25.3373, 55.4120),
        ("Ajman", "https://en.wikipedia.org/wiki/Ajman", 25.4052, 55.5136),
        ("Ras Al Khaimah", "https://en.wikipedia.org/wiki/Ras_Al_Khaimah", 25.7889, 55.9598),
        ("Fujairah", "https://en.wikipedia.org/wiki/Fujairah", 25.1164, 56.3265),
        ("Umm Al Quwain", "https://en.wikipedia.org/wiki/Umm_Al_Quwain", 25.5641, 55.6552),
    ]
    .into_iter()
    .map(|(name, url, latitude, longitude)| City {
        name: name.to_string(),
        url: url.to_string(),
        latitude,
        longitude,
    })
    .collect()
}

/// City list from a JSON file, or the built-in defaults when no file is given.
pub fn cities(path: Option<&Path>) -> Result<Vec<City>> {
    match path {
        Some(path) => load(path),
        None => Ok(default_cities()),
    }
}

fn load(path: &Path) -> Result<Vec<City>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read city list {}", path.display()))?;
    let cities: Vec<City> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid city list {}", path.display()))?;
    ensure!(!cities.is_empty(), "city list {} is empty", path.display());
    Ok(cities)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_has_seven_cities() {
        let cities = default_cities();
        assert_eq!(cities.len(), 7);
        assert!(cities
            .iter()
            .all(|c| c.url.starts_with("https://en.wikipedia.org/wiki/")));
    }

    #[test]
    fn loads_json_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        std::fs::write(
            &path,
            r#"[{"name":"Muscat","url":"https://en.wikipedia.org/wiki/Muscat","latitude":23.588,"longitude":58.3829}]"#,
        )
        .unwrap();

        let cities = cities(Some(path.as_path())).unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Muscat");
        assert_eq!(cities[0].latitude, 23.588);
    }

    #[test]
    fn empty_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(cities(Some(path.as_path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(cities(Some(Path::new("no/such/cities.json"))).is_err());
    }
}
