use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;

use crate::config::City;
use crate::db::CurrentConditions;
use crate::fetch::FetchError;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: MainReadings,
    weather: Vec<WeatherEntry>,
    #[serde(default)]
    wind: Wind,
    #[serde(default)]
    visibility: f64,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
}

/// Supplementary current-conditions source. Separate record shape from the
/// page extraction; the two never feed each other.
pub struct ApiClient {
    client: reqwest::Client,
    api_key: String,
}

impl ApiClient {
    /// Reads the API key from the environment. `Ok(None)` means collection is
    /// disabled, not an error.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(api_key) = std::env::var(API_KEY_ENV) else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Some(Self { client, api_key }))
    }

    /// Current conditions for one city by coordinates, metric units.
    pub async fn current_conditions(&self, city: &City) -> Result<CurrentConditions, FetchError> {
        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("lat", city.latitude.to_string()),
                ("lon", city.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let parsed: ApiResponse = response.json().await?;

        Ok(CurrentConditions {
            city_name: city.name.clone(),
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            condition: parsed
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
            wind_speed: parsed.wind.speed,
            visibility_m: parsed.visibility,
            observed_at: Utc::now().to_rfc3339(),
        })
    }
}

// ── Tests ──
