//! CLI entry point for the ceremony-date rater.
//!
//! Provides subcommands for predicting per-station ceremony dates from ride
//! records, exporting daily counts, and auditing the holiday calendar.

use anyhow::{Context, Result};
use ceremony_rater::calendar::{HolidayCalendar, HolidayList, holidays_in_year};
use ceremony_rater::config::{DetectionPolicy, Settings};
use ceremony_rater::detection::pipeline::{run, station_timeline};
use ceremony_rater::output::{
    print_json, timeline_path, write_daily_counts, write_date_summary, write_distribution,
    write_json, write_predictions, write_report, write_timeline,
};
use ceremony_rater::parser::{load_rides, load_target_stations};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ceremony_rater")]
#[command(about = "Infer school ceremony dates from station ridership", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the ceremony date for each target station and overall
    Predict {
        /// Ride records CSV (one row per trip, or pre-aggregated with a count column)
        #[arg(long)]
        rides: PathBuf,

        /// CSV listing target stations (e.g. station/school pairs)
        #[arg(long)]
        stations: PathBuf,

        /// Optional JSON settings file
        #[arg(short, long)]
        config: Option<String>,

        /// Trailing baseline window, in observations
        #[arg(long)]
        window: Option<usize>,

        /// Ratio a point must reach to count as a spike
        #[arg(long, alias = "multiplier")]
        ratio_threshold: Option<f64>,

        /// Baseline floor below which a spike is not trusted
        #[arg(long, alias = "min_count")]
        min_baseline: Option<u64>,

        /// Detection policy
        #[arg(long, value_enum)]
        policy: Option<DetectionPolicy>,

        /// Disable the fallback date when nothing qualifies
        #[arg(long, default_value_t = false)]
        no_guarantee: bool,

        /// Exclude weekends and public holidays before computing baselines
        #[arg(long, default_value_t = false)]
        exclude_weekend_holiday: bool,

        /// Optional JSON holiday list added to the configured calendar
        #[arg(long)]
        holidays: Option<String>,

        /// Directory for CSV and JSON outputs
        #[arg(short, long, default_value = "outputs")]
        output_dir: PathBuf,

        /// Write a baseline timeline CSV per station
        #[arg(long, default_value_t = false)]
        timeline: bool,

        /// Write the zero-filled per-day station count
        #[arg(long, default_value_t = false)]
        distribution: bool,

        /// Write the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Collapse ride records into daily (date, station, count) rows
    Aggregate {
        #[arg(long)]
        rides: PathBuf,

        /// CSV file to write
        #[arg(short, long, default_value = "daily_counts.csv")]
        output: PathBuf,

        /// Optional JSON settings file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// List the holidays the calendar filter recognises for a year
    Holidays {
        #[arg(long)]
        year: i32,

        /// Optional JSON settings file
        #[arg(short, long)]
        config: Option<String>,

        /// Optional JSON holiday list
        #[arg(long)]
        holidays: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ceremony_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ceremony_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            rides,
            stations,
            config,
            window,
            ratio_threshold,
            min_baseline,
            policy,
            no_guarantee,
            exclude_weekend_holiday,
            holidays,
            output_dir,
            timeline,
            distribution,
            json,
        } => {
            let mut settings = Settings::load_or_default(config.as_deref())?;

            // Flags override the settings file
            let detector = &mut settings.detector;
            if let Some(w) = window {
                detector.window = w;
            }
            if let Some(t) = ratio_threshold {
                detector.ratio_threshold = t;
            }
            if let Some(m) = min_baseline {
                detector.min_baseline = m;
            }
            if let Some(p) = policy {
                detector.policy = p;
            }
            if no_guarantee {
                detector.guarantee_fallback = false;
            }
            if exclude_weekend_holiday {
                detector.exclude_weekend_holiday = true;
            }

            let options = PredictOutputs {
                output_dir,
                timeline,
                distribution,
                json,
            };
            predict(&rides, &stations, &settings, holidays.as_deref(), &options)?;
        }
        Commands::Aggregate {
            rides,
            output,
            config,
        } => {
            let settings = Settings::load_or_default(config.as_deref())?;
            let daily = load_rides(&rides, &settings.columns)?.into_daily_counts();
            write_daily_counts(&output, &daily)?;
        }
        Commands::Holidays {
            year,
            config,
            holidays,
        } => {
            let settings = Settings::load_or_default(config.as_deref())?;
            let mut calendar = settings.calendar();
            if let Some(path) = holidays {
                calendar.push(HolidayList::load(&path)?);
            }

            let listed = holidays_in_year(&calendar, year);
            info!(year, count = listed.len(), "Holiday list");
            for (date, name) in &listed {
                println!("{date} {name}");
            }
        }
    }

    Ok(())
}

struct PredictOutputs {
    output_dir: PathBuf,
    timeline: bool,
    distribution: bool,
    json: bool,
}

/// Loads inputs, runs detection, prints the report, and writes the exports.
#[tracing::instrument(skip_all, fields(rides = %rides.display(), stations = %stations.display()))]
fn predict(
    rides: &Path,
    stations: &Path,
    settings: &Settings,
    holiday_file: Option<&str>,
    options: &PredictOutputs,
) -> Result<()> {
    let config = &settings.detector;
    info!(?config, "Detector configuration");

    let mut calendar = settings.calendar();
    if let Some(path) = holiday_file {
        calendar.push(HolidayList::load(path)?);
    }

    let daily = load_rides(rides, &settings.columns)?.into_daily_counts();
    let targets = load_target_stations(stations, &settings.columns)?;
    if targets.is_empty() {
        warn!("No target stations found");
    }

    let report = run(daily.clone(), &targets, config, &calendar)?;

    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &report)?;

    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!("Failed to create output directory '{}'", options.output_dir.display())
    })?;

    write_date_summary(&options.output_dir.join("ceremony_summary_by_date.csv"), &report.consensus)?;
    write_predictions(&options.output_dir.join("predictions.csv"), &report.predictions)?;

    if options.distribution {
        let days = report.consensus.distribution();
        if days.is_empty() {
            warn!("Ceremony dates are empty. Distribution skipped.");
        } else {
            write_distribution(&options.output_dir.join("ceremony_distribution.csv"), &days)?;
        }
    }

    if options.timeline {
        for prediction in &report.predictions {
            let points = station_timeline(&daily, &prediction.station, config, &calendar);
            if points.is_empty() {
                continue;
            }
            let path = timeline_path(&options.output_dir, &prediction.station);
            write_timeline(&path, &points, prediction.predicted_date)?;
        }
        info!(dir = %options.output_dir.display(), "Saved station timelines");
    }

    if options.json {
        write_json(&options.output_dir.join("report.json"), &report)?;
        print_json(&report)?;
    }

    if calendar.is_empty() && config.exclude_weekend_holiday {
        warn!("Holiday filter enabled with no calendar; only weekends are excluded");
    }
    if let Some(date) = report.consensus.overall_date {
        info!(date = %date, holiday = calendar.is_holiday(date), "Overall ceremony date");
    }

    Ok(())
}
