use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use antisana_forecast_service::config::{parse_base_url, Config};
use antisana_forecast_service::fetcher::ResourceFetcher;
use antisana_forecast_service::forecast::{self, ForecastContext, RandomNoise};
use antisana_forecast_service::importers::{SpreadsheetReader, StationLoader, DEFAULT_HEADER_ROWS};
use antisana_forecast_service::models::PredictionResult;
use antisana_forecast_service::services::PredictionRequest;
use antisana_forecast_service::stations::{find_station, DEFAULT_STATION_ID, STATIONS};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Run the Antisana predictive model against station spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding the station spreadsheets
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Base URL serving the station spreadsheets (takes precedence over --data-dir)
    #[arg(long, env = "DATA_BASE_URL")]
    base_url: Option<String>,

    /// Leading rows skipped in every spreadsheet
    #[arg(long, env = "HEADER_ROWS", default_value_t = DEFAULT_HEADER_ROWS)]
    header_rows: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Predict one station for a target month
    Predict {
        /// Station code (H44, H55, P42, P43, P55)
        #[arg(long, default_value = DEFAULT_STATION_ID)]
        station: String,

        #[arg(long, default_value_t = 2025)]
        year: i32,

        /// Month 1-12
        #[arg(long, default_value_t = 1)]
        month: u32,

        /// Read this spreadsheet instead of the station's own resource
        #[arg(long)]
        file: Option<PathBuf>,

        /// Seed the random residual for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Load every station and report what was found
    Stations {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn build_loader(source: &SourceArgs) -> Result<StationLoader, Box<dyn std::error::Error>> {
    let defaults = Config::default();
    let fetcher = match &source.base_url {
        Some(url) => ResourceFetcher::remote(
            parse_base_url(url)?,
            Duration::from_secs(defaults.http_timeout_secs),
        )?,
        None => ResourceFetcher::directory(source.data_dir.clone()),
    };
    Ok(StationLoader::new(fetcher, SpreadsheetReader::new(source.header_rows)))
}

fn print_summary(result: &PredictionResult) {
    let unit = result.kind.unit();
    println!("Station:        {} ({})", result.station_name, result.kind.label());
    println!("Target month:   {}", result.target_date.format("%B %Y"));
    println!("Records:        {}", result.record_count);
    println!("Predicted:      {:.2} {}", result.predicted_value(), unit);
    println!("Discharge:      {:.2} m³/s", result.discharge);
    println!("Max flow:       {:.1} m³/s", result.max_flow);
    println!("Confidence:     {:.1}%", result.confidence);
    println!();
    println!("Projection:");
    for point in &result.projection {
        println!("  {:<10} {:>10.2} {}", point.label, point.value, unit);
    }
    println!();
    println!("Seasonality:");
    for point in &result.seasonality {
        println!("  {:<10} {:>10.2} {}", point.label, point.value, unit);
    }
}

async fn run_predict(
    request: PredictionRequest,
    file: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
    source: SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let station = find_station(&request.station_id)
        .ok_or_else(|| format!("Unknown station: {}", request.station_id))?;
    let target_date = request.target_date()?;

    let series = match file {
        Some(path) => {
            info!("Reading {}", path.display());
            let bytes = tokio::fs::read(&path).await?;
            SpreadsheetReader::new(source.header_rows).read_bytes(bytes)?
        }
        None => build_loader(&source)?.try_load(station).await?,
    };

    if series.is_empty() {
        return Err(format!("No data available for station {}", station.id).into());
    }

    let mut noise = RandomNoise::from_seed_option(seed);
    let result = forecast::predict(
        station,
        &series,
        target_date,
        &ForecastContext::today_utc(),
        &mut noise,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

async fn run_stations(source: SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = build_loader(&source)?;

    let progress = ProgressBar::new(STATIONS.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut rows = Vec::with_capacity(STATIONS.len());
    for station in STATIONS.iter() {
        progress.set_message(station.id);
        let readings = loader.load(station).await;
        rows.push((station, readings));
        progress.inc(1);
    }
    progress.finish_with_message("done");

    println!("{:<5} {:<30} {:<14} {:>8}  span", "id", "name", "kind", "records");
    for (station, readings) in rows {
        let span = match (readings.first(), readings.last()) {
            (Some(first), Some(last)) => format!("{} .. {}", first.date, last.date),
            _ => "no data available".to_string(),
        };
        println!(
            "{:<5} {:<30} {:<14} {:>8}  {}",
            station.id,
            station.name,
            station.kind.label(),
            readings.len(),
            span
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        // stdout is reserved for the report / JSON
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Predict {
            station,
            year,
            month,
            file,
            seed,
            json,
            source,
        } => {
            let request = PredictionRequest::new(station, year, month);
            run_predict(request, file, seed, json, source).await
        }
        Command::Stations { source } => run_stations(source).await,
    }
}
