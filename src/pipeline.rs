use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::City;
use crate::db;
use crate::extract;
use crate::fetch::Fetcher;

/// Politeness delay between successive page fetches.
const FETCH_DELAY: Duration = Duration::from_secs(3);

const EXTRACTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const API_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// What one sweep accomplished. Every city ends up counted in `processed` or
/// named in `failed`, never dropped silently.
pub struct RunOutcome {
    pub processed: usize,
    pub failed: Vec<String>,
}

impl RunOutcome {
    pub fn print(&self, total: usize) {
        println!("Processed {}/{} cities.", self.processed, total);
        if !self.failed.is_empty() {
            println!("Failed: {}", self.failed.join(", "));
        }
    }
}

/// One extraction sweep: every city in order, one record or one failure each.
/// A fetch failure skips that city; a persistence failure aborts the run.
pub async fn extract_all_cities(
    conn: &Connection,
    fetcher: &Fetcher,
    cities: &[City],
) -> Result<RunOutcome> {
    let pb = ProgressBar::new(cities.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut processed = 0usize;
    let mut failed = Vec::new();

    for (i, city) in cities.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(FETCH_DELAY).await;
        }
        pb.set_message(city.name.clone());

        match fetcher.fetch_page(&city.url).await {
            Ok(body) => {
                let record = extract::extract_all(&city.name, &body);
                db::save_record(conn, &record)?;
                processed += 1;
                info!("processed {}", city.name);
            }
            Err(e) => {
                warn!("fetch failed for {}: {}", city.name, e);
                failed.push(city.name.clone());
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("extraction run: {}/{} cities", processed, cities.len());
    Ok(RunOutcome { processed, failed })
}

/// One API sweep. Per-city failures are tolerated the same way page fetches
/// are.
pub async fn collect_current_conditions(
    conn: &Connection,
    api: &ApiClient,
    cities: &[City],
) -> Result<RunOutcome> {
    let mut processed = 0usize;
    let mut failed = Vec::new();

    for city in cities {
        match api.current_conditions(city).await {
            Ok(conditions) => {
                db::save_current(conn, &conditions)?;
                processed += 1;
                info!("current conditions saved for {}", city.name);
            }
            Err(e) => {
                warn!("API request failed for {}: {}", city.name, e);
                failed.push(city.name.clone());
            }
        }
    }

    Ok(RunOutcome { processed, failed })
}

/// Recurring mode: page extraction every 24h, API collection every 6h when a
/// key is configured. Both run immediately on startup. Runs until interrupted;
/// rows persisted before an interrupt stay put.
pub async fn run_scheduled(
    conn: &Connection,
    fetcher: &Fetcher,
    api: Option<&ApiClient>,
    cities: &[City],
) -> Result<()> {
    if api.is_none() {
        warn!(
            "no {} set, API collection disabled",
            crate::api::API_KEY_ENV
        );
    }

    let mut extraction_ticks = tokio::time::interval(EXTRACTION_INTERVAL);
    let mut api_ticks = tokio::time::interval(API_INTERVAL);

    loop {
        tokio::select! {
            _ = extraction_ticks.tick() => {
                info!("scheduled extraction starting");
                let outcome = extract_all_cities(conn, fetcher, cities).await?;
                outcome.print(cities.len());
            }
            _ = api_ticks.tick(), if api.is_some() => {
                if let Some(api) = api {
                    info!("scheduled API collection starting");
                    let outcome = collect_current_conditions(conn, api, cities).await?;
                    outcome.print(cities.len());
                }
            }
        }
    }
}

// ── Tests ──
