use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; WikiWeatherBot/1.0; weather data collection)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a page could not be acquired. Fatal for that city only; the pipeline
/// records the city as failed and moves on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch raw page markup. No retries here; whether to retry is the
    /// caller's call.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}
