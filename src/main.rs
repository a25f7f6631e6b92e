//! AirSense CLI - live CPCB air quality index for any location.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use airsense_service::alert::recommendations::{Advisory, recommendations_for};
use airsense_service::analysis::aqi::{AqiOutcome, assess};
use airsense_service::analysis::levels::{PollutantLevel, pollutant_levels};
use airsense_service::compare::ComparisonRow;
use airsense_service::config::{self, ApiCredentials, Config, TrendBackend};
use airsense_service::ingest::openweather::OpenWeatherClient;
use airsense_service::logging::{self, DataSource};
use airsense_service::model::{LookupError, Pollutant, PollutantReading, TrendEntry};
use airsense_service::report::{AirSenseService, AqiReport};
use airsense_service::trend::TrendLog;

#[derive(Parser)]
#[command(name = "airsense", version, about = "CPCB air quality index from live pollutant data")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch live AQI for a location and print the full report
    Fetch {
        /// City or area, e.g. "Mumbai"
        location: String,

        /// Day to record in the trend log (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Compute AQI offline from pollutant=value pairs, e.g. pm2_5=45 pm10=20
    Compute {
        #[arg(required = true, value_parser = parse_pollutant_pair)]
        values: Vec<(Pollutant, f64)>,
    },

    /// Print the stored trend for a location
    Trend {
        location: String,
    },
}

fn parse_pollutant_pair(arg: &str) -> Result<(Pollutant, f64), String> {
    let (id, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected pollutant=value, got '{}'", arg))?;
    let pollutant = Pollutant::from_id(id.trim())
        .ok_or_else(|| format!("unknown pollutant '{}'", id.trim()))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid concentration '{}'", value.trim()))?;
    if value.is_nan() || value < 0.0 {
        return Err(format!("concentration must be non-negative, got {}", value));
    }
    Ok((pollutant, value))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = Config::load(&cli.config)?;
    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(
        DataSource::System,
        None,
        &format!(
            "Loaded config from {}, trend backend {:?}",
            cli.config.display(),
            config.trend.backend
        ),
    );

    match cli.command {
        Command::Compute { values } => {
            let reading: PollutantReading = values.into_iter().collect();
            let assessment = assess(&reading);
            print_outcome(&assessment.outcome);
            print_levels(&pollutant_levels(&reading));
            print_advisories(&recommendations_for(&reading));
            Ok(ExitCode::SUCCESS)
        }

        Command::Trend { location } => {
            let mut trend_log = open_trend_log(&config);
            print_trend(&trend_log.recent(location.trim(), config.trend.recent_days));
            Ok(ExitCode::SUCCESS)
        }

        Command::Fetch { location, date } => {
            let credentials = ApiCredentials::from_env()?;
            let client = OpenWeatherClient::new(config.provider.clone(), credentials)?;
            let mut service = AirSenseService::new(
                client,
                open_trend_log(&config),
                config.comparison.cities.clone(),
                config.trend.recent_days,
            );

            let date = date.unwrap_or_else(|| Local::now().date_naive());
            match service.fetch_report(&location, date) {
                Ok(report) => {
                    print_report(&report);
                    Ok(ExitCode::from(lookup_status(report.detail.as_ref().err())))
                }
                Err(e) => {
                    print_lookup_failure(&e);
                    Ok(ExitCode::from(lookup_status(Some(&e))))
                }
            }
        }
    }
}

/// The database URL is only read from the environment when the PostgreSQL
/// backend is selected.
fn open_trend_log(config: &Config) -> TrendLog {
    let database_url = match config.trend.backend {
        TrendBackend::Postgres => config::database_url_from_env().ok(),
        TrendBackend::File => None,
    };
    TrendLog::open(&config.trend, database_url.as_deref())
}

/// 2 for unusable input, 3 for provider failures.
fn lookup_status(failure: Option<&LookupError>) -> u8 {
    match failure {
        None => 0,
        Some(LookupError::EmptyLocation | LookupError::LocationNotFound(_)) => 2,
        Some(LookupError::ProviderUnavailable { .. }) => 3,
    }
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

fn print_lookup_failure(err: &LookupError) {
    match err {
        LookupError::EmptyLocation => {
            eprintln!("⚠️ Please enter a location before fetching AQI.")
        }
        LookupError::LocationNotFound(_) => {
            eprintln!("❌ No location found. Please check your input.")
        }
        LookupError::ProviderUnavailable { .. } => {
            eprintln!("❌ Could not fetch AQI data from OpenWeather API: {}", err)
        }
    }
}

fn print_report(report: &AqiReport) {
    match &report.detail {
        Ok(detail) => {
            println!(
                "Data for {}, {} ({:.4}, {:.4})",
                report.location,
                report.date,
                detail.coordinates.latitude,
                detail.coordinates.longitude
            );
            println!();
            print_outcome(&report.outcome);
            if let Some(category) = report.outcome.category {
                println!("Health impact: {} ({})", category.health_impact(), category.color());
            }
            println!();
            print_levels(&detail.levels);
            println!();
            print_advisories(&detail.advisories);
        }
        Err(e) => {
            print_lookup_failure(e);
            println!("Data for {}, {}", report.location, report.date);
            println!();
            print_outcome(&report.outcome);
        }
    }
    println!();
    print_trend(&report.trend);
    println!();
    print_comparison(&report.comparison);
}

fn print_outcome(outcome: &AqiOutcome) {
    println!("🌐 Overall AQI Summary");
    match outcome.value {
        Some(value) => {
            println!("  AQI Value:          {}", value);
            println!("  Category:           {}", outcome.category_label());
            println!("  Dominant Pollutant: {}", outcome.dominant_label());
        }
        None => println!("  Unable to determine AQI."),
    }
}

fn print_levels(levels: &[PollutantLevel]) {
    println!("🌫️ Live Pollutant Values");
    for level in levels {
        let limit = match level.limit {
            Some(limit) if level.exceeds() => format!("limit {} ⚠", limit),
            Some(limit) => format!("limit {}", limit),
            None => String::new(),
        };
        println!("  {:<6} {:>9.2} µg/m³  {}", level.pollutant.label(), level.value, limit);
    }
}

fn print_advisories(advisories: &[Advisory]) {
    println!("💡 Health Recommendations");
    for advisory in advisories {
        println!("  - {}", advisory);
    }
}

fn print_trend(trend: &[TrendEntry]) {
    println!("📈 Recent AQI Trend");
    if trend.is_empty() {
        println!("  No history recorded yet.");
    }
    for entry in trend {
        println!("  {}  {:>3}", entry.date, entry.aqi);
    }
}

fn print_comparison(rows: &[ComparisonRow]) {
    println!("🏙️ City Comparison");
    for row in rows {
        println!("  {:<16} {:>3}  {}", row.location, row.aqi, row.category_label());
    }
}
