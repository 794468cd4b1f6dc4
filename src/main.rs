mod api;
mod config;
mod db;
mod export;
mod extract;
mod fetch;
mod pipeline;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wiki_weather",
    about = "City climate facts scraped from encyclopedia pages into SQLite"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and extract climate facts for every configured city
    Run {
        /// JSON file with the city list (defaults to the built-in UAE set)
        #[arg(short, long)]
        cities: Option<PathBuf>,
    },
    /// Keep extracting on a recurring schedule (pages every 24h, API every 6h)
    Schedule {
        #[arg(short, long)]
        cities: Option<PathBuf>,
    },
    /// Collect current conditions from the weather API once
    Current {
        #[arg(short, long)]
        cities: Option<PathBuf>,
    },
    /// Show stored records
    Summary {
        /// Single city instead of all
        #[arg(long)]
        city: Option<String>,
    },
    /// Show database counts
    Stats,
    /// Write the latest record per city to a CSV file
    Export {
        #[arg(short, long, default_value = "weather_export.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { cities } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let cities = config::cities(cities.as_deref())?;
            let fetcher = fetch::Fetcher::new()?;
            println!("Extracting weather data for {} cities...", cities.len());
            let outcome = pipeline::extract_all_cities(&conn, &fetcher, &cities).await?;
            outcome.print(cities.len());
            Ok(())
        }
        Commands::Schedule { cities } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let cities = config::cities(cities.as_deref())?;
            let fetcher = fetch::Fetcher::new()?;
            let api = api::ApiClient::from_env()?;
            println!("Scheduler started: pages every 24h, API every 6h. Ctrl-C to stop.");
            pipeline::run_scheduled(&conn, &fetcher, api.as_ref(), &cities).await
        }
        Commands::Current { cities } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let cities = config::cities(cities.as_deref())?;
            let Some(api) = api::ApiClient::from_env()? else {
                println!("Set {} to enable API collection.", api::API_KEY_ENV);
                return Ok(());
            };
            let outcome = pipeline::collect_current_conditions(&conn, &api, &cities).await?;
            outcome.print(cities.len());
            Ok(())
        }
        Commands::Summary { city } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_records(&conn, city.as_deref())?;
            if rows.is_empty() {
                println!("No weather data stored. Run 'run' first.");
                return Ok(());
            }
            print_summary(&rows);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Cities:      {}", s.cities);
            println!("Records:     {}", s.records);
            println!("API records: {}", s.api_records);
            println!("Last run:    {}", s.last_extracted.as_deref().unwrap_or("-"));
            Ok(())
        }
        Commands::Export { output } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let count = export::write_csv(&conn, &output)?;
            println!("Wrote {} rows to {}", count, output.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_summary(rows: &[db::RecordRow]) {
    println!(
        "{:<16} | {:>8} | {:>8} | {:<14} | {:>6} | {:>8} | {:<19} | {}",
        "City", "Lat", "Lon", "Climate", "Avg°C", "Rain mm", "Extracted", "Description"
    );
    println!("{}", "-".repeat(118));

    for row in rows {
        let r = &row.record;
        println!(
            "{:<16} | {:>8} | {:>8} | {:<14} | {:>6} | {:>8} | {:<19} | {}",
            truncate(&r.city_name, 16),
            fmt_opt(r.latitude),
            fmt_opt(r.longitude),
            truncate(r.climate_type.as_deref().unwrap_or("-"), 14),
            fmt_opt(r.avg_temperature_celsius),
            fmt_opt(r.annual_rainfall_mm),
            row.extracted_at,
            truncate(r.weather_description.as_deref().unwrap_or("-"), 60),
        );
    }

    println!("\n{} records", rows.len());
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
