//! CLI entry point for the bike-share trip analysis.
//!
//! Provides subcommands for condensing raw city exports, summarising the
//! condensed trips, comparing cities and producing chart specifications.

use anyhow::{Context, Result};
use bikeshare_eda::analyzers::aggregate::{
    count_by_user_type, duration_by_user_type, duration_stats, rush_hour_breakdown,
};
use bikeshare_eda::city::City;
use bikeshare_eda::condense::condense_data;
use bikeshare_eda::config::CityManifest;
use bikeshare_eda::input::first_record;
use bikeshare_eda::report::{
    self, DEFAULT_HISTOGRAM_CUTOFF, compare_cities, describe_comparison, describe_counts,
    describe_durations, describe_rush_hours, describe_user_durations, duration_histogram,
    duration_histograms_by_user_type, rush_hour_chart,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_eda")]
#[command(about = "Exploratory analysis of bike-share trip exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first record of a raw or condensed trip file
    Peek {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Condense one raw city export into the five canonical columns
    Condense {
        /// City layout of the input (inferred from the file name if omitted)
        #[arg(short, long)]
        city: Option<City>,

        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Condense every city listed in the manifest
    CondenseAll {
        /// City manifest (defaults to $BIKESHARE_MANIFEST or cities.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Print trip counts and duration statistics for every manifest city
    Summary {
        /// City manifest (defaults to $BIKESHARE_MANIFEST or cities.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Rush-hour usage on weekdays against weekends, by rider type
    RushHours {
        /// City used in the chart title (inferred from the file name if omitted)
        #[arg(short, long)]
        city: Option<City>,

        #[arg(value_name = "CONDENSED")]
        file: PathBuf,

        /// Write the bar chart specification to this JSON file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Trip duration histogram specification
    Histogram {
        #[arg(value_name = "CONDENSED")]
        file: PathBuf,

        /// Separate histograms for subscribers and customers
        #[arg(long, default_value_t = false)]
        by_user_type: bool,

        /// Per-rider histograms keep durations below this many minutes
        #[arg(long, default_value_t = DEFAULT_HISTOGRAM_CUTOFF)]
        max_minutes: f64,

        /// Number of equal-width bins to count
        #[arg(short, long, default_value_t = 10)]
        bins: usize,

        /// Write the histogram specification to this JSON file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_eda.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_eda.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Peek { file } => {
            let city = City::from_path(&file).ok();
            match first_record(&file)? {
                Some(record) => {
                    info!(path = %file.display(), city = ?city, "First record");
                    println!("{}", report::to_json(&record)?);
                }
                None => warn!(path = %file.display(), "File has no data rows"),
            }
        }
        Commands::Condense {
            city,
            input,
            output,
        } => {
            let city = resolve_city(city, &input)?;
            let rows = condense_data(&input, &output, city)?;
            info!(%city, rows, output = %output.display(), "Condensed");
        }
        Commands::CondenseAll { manifest } => {
            let manifest = load_manifest(manifest)?;
            for (city, files) in manifest.iter() {
                let rows = condense_data(&files.in_file, &files.out_file, city)
                    .with_context(|| format!("failed to condense {city}"))?;
                info!(%city, rows, output = %files.out_file.display(), "Condensed");
            }
        }
        Commands::Summary { manifest } => {
            let manifest = load_manifest(manifest)?;
            let mut all_counts = Vec::new();

            for (city, files) in manifest.iter() {
                let condensed = &files.out_file;
                let counts = count_by_user_type(condensed)?;
                let durations = duration_stats(condensed)?;
                let by_type = duration_by_user_type(condensed)?;

                println!("{}", describe_counts(city, &counts)?);
                println!("{}", describe_durations(city, &durations));
                println!("{}", describe_user_durations(city, &by_type));

                all_counts.push((city, counts));
            }

            let comparison = compare_cities(&all_counts)?;
            println!("{}", describe_comparison(&comparison));
        }
        Commands::RushHours { city, file, chart } => {
            let city = resolve_city(city, &file)?;
            let breakdown = rush_hour_breakdown(&file)?;

            println!("{}", describe_rush_hours(&breakdown));
            let spec = report::to_json(&rush_hour_chart(city, &breakdown))?;
            emit(&spec, chart.as_deref())?;
        }
        Commands::Histogram {
            file,
            by_user_type,
            max_minutes,
            bins,
            chart,
        } => {
            let histograms = if by_user_type {
                duration_histograms_by_user_type(&file, max_minutes)?.to_vec()
            } else {
                vec![duration_histogram(&file)?]
            };

            let specs: Vec<_> = histograms
                .iter()
                .map(|h| serde_json::json!({ "histogram": h, "bins": h.bin_counts(bins) }))
                .collect();
            emit(&report::to_json(&specs)?, chart.as_deref())?;
        }
    }

    Ok(())
}

/// Uses the explicit city, otherwise infers it from the file name.
fn resolve_city(city: Option<City>, path: &Path) -> Result<City> {
    match city {
        Some(city) => Ok(city),
        None => City::from_path(path)
            .with_context(|| format!("cannot infer city from '{}'; pass --city", path.display())),
    }
}

fn load_manifest(path: Option<PathBuf>) -> Result<CityManifest> {
    let path = path.unwrap_or_else(CityManifest::default_path);
    let manifest = CityManifest::load(&path)?;
    if manifest.is_empty() {
        warn!(path = %path.display(), "City manifest lists no cities");
    }
    Ok(manifest)
}

/// Writes a chart specification to `path`, or stdout when no path is given.
fn emit(spec: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, spec)
                .with_context(|| format!("failed to write chart to '{}'", path.display()))?;
            info!(path = %path.display(), "Chart specification written");
        }
        None => println!("{spec}"),
    }
    Ok(())
}
