//! CLI entry point for the transit dashboard analytics.
//!
//! Loads the GTFS feed and derived summaries once, then answers one
//! dashboard query per invocation as JSON (or debug output) with optional
//! CSV export.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_insights::analyzers::aggregate::{
    Analytics, Metric, SamplePolicy, Sampling, distribution, headings, hourly_trip_times,
    route_short_names, trip_time_distribution,
};
use transit_insights::analyzers::calendar::parse_weekday;
use transit_insights::analyzers::kpi::network_kpis;
use transit_insights::analyzers::longest::{
    RankBy, extremes, hourly_averages, route_geometry, route_stats,
};
use transit_insights::analyzers::types::HourlyPoint;
use transit_insights::analyzers::utility::mean;
use transit_insights::config::DataPaths;
use transit_insights::output::{append_records, print_json, print_pretty};
use transit_insights::stats::FeedStats;
use transit_insights::Dataset;

#[derive(Parser)]
#[command(name = "transit_insights")]
#[command(about = "Bus network analytics over a GTFS feed", long_about = None)]
struct Cli {
    /// Directory holding the GTFS tables and derived CSVs
    #[arg(short, long, global = true, default_value = "transit")]
    data_dir: String,

    /// JSON file overriding individual table file names
    #[arg(long, global = true)]
    paths: Option<String>,

    /// How to print results
    #[arg(long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// CSV file to append tabular results to
    #[arg(short, long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum Granularity {
    Weekly,
    Daily,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rank {
    TripTime,
    Stops,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed size and network KPIs
    Summary {
        /// Year the KPI averages cover
        #[arg(short, long, default_value_t = 2022)]
        year: i32,
    },
    /// List every bus line
    Lines,
    /// List the headings a line runs towards
    Headings {
        #[arg(short, long)]
        route: String,
    },
    /// Stop count, longest trip time and average gap between stops
    RouteStats {
        #[arg(short, long)]
        route: String,
        #[arg(long)]
        heading: String,
    },
    /// Shape and stops of a line's longest trip, for map rendering
    Geometry {
        #[arg(short, long)]
        route: String,
        #[arg(long)]
        heading: String,
    },
    /// Average trip time per day type, or per hour from the precomputed table
    TripTimes {
        #[arg(long)]
        heading: String,
        #[arg(short, long, value_enum, default_value_t = Granularity::Weekly)]
        granularity: Granularity,
        #[command(flatten)]
        sample: SampleArgs,
    },
    /// Average time between stops per day type
    StopGaps {
        #[arg(long)]
        heading: String,
        #[command(flatten)]
        sample: SampleArgs,
    },
    /// Trip time distribution of a line and heading
    Distribution {
        #[arg(short, long)]
        route: String,
        #[arg(long)]
        heading: String,
    },
    /// Average trip time by departure hour, computed from stop times
    Hourly {
        #[arg(long)]
        heading: String,
        /// Calendar day, monday..sunday
        #[arg(long, default_value = "monday")]
        day: String,
    },
    /// Lines whose trips serve the most stops
    Busiest {
        #[arg(short, default_value_t = 10)]
        n: usize,
    },
    /// Lines with the highest and lowest trip time or stop count
    Longest {
        #[arg(short, default_value_t = 10)]
        n: usize,
        #[arg(long, value_enum, default_value_t = Rank::TripTime)]
        by: Rank,
    },
}

#[derive(clap::Args)]
struct SampleArgs {
    /// Trips sampled per service
    #[arg(long, default_value_t = 5)]
    sample: usize,

    /// Sample the latest departures instead of the last trips in the table
    #[arg(long, default_value_t = false)]
    by_departure: bool,
}

impl From<&SampleArgs> for Sampling {
    fn from(args: &SampleArgs) -> Self {
        Sampling {
            per_service: args.sample,
            policy: if args.by_departure {
                SamplePolicy::LatestDeparture
            } else {
                SamplePolicy::TableOrder
            },
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/transit_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_insights.log"));

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

    let mut paths = DataPaths::new(&cli.data_dir);
    if let Some(overrides) = &cli.paths {
        paths = paths
            .with_overrides_file(overrides)
            .with_context(|| format!("Failed to read path overrides from {overrides}"))?;
    }

    let data = Dataset::load(&paths)
        .with_context(|| format!("Failed to load transit data from {}", cli.data_dir))?;
    let analytics = Analytics::new(&data);
    let out = Emitter {
        format: cli.format,
        csv: cli.output.as_deref(),
    };

    match &cli.command {
        Commands::Summary { year } => {
            out.show(&FeedStats::from_dataset(&data))?;
            out.table(&network_kpis(&data, *year))?;
        }
        Commands::Lines => {
            out.show(&route_short_names(&data))?;
        }
        Commands::Headings { route } => {
            out.show(&headings(&data, route)?)?;
        }
        Commands::RouteStats { route, heading } => {
            out.table(&[route_stats(&data, route, heading)?])?;
        }
        Commands::Geometry { route, heading } => {
            out.show(&route_geometry(&data, route, heading)?)?;
        }
        Commands::TripTimes {
            heading,
            granularity,
            sample,
        } => match granularity {
            Granularity::Weekly => {
                let weekly = analytics.weekly_averages(heading, Metric::TripTime, sample.into())?;
                out.table(&weekly)?;
            }
            Granularity::Daily => {
                let hourly = hourly_averages(&data, heading);
                if hourly.is_empty() {
                    warn!(heading = %heading, "No hourly averages for heading");
                }
                out.table(&hourly)?;
            }
        },
        Commands::StopGaps { heading, sample } => {
            let weekly = analytics.weekly_averages(heading, Metric::InterStopTime, sample.into())?;
            out.table(&weekly)?;
        }
        Commands::Distribution { route, heading } => {
            let times = trip_time_distribution(&data, route, heading)?;
            match distribution(&times) {
                Some(summary) => out.table(&[summary])?,
                None => warn!(route = %route, heading = %heading, "No trips to summarise"),
            }
        }
        Commands::Hourly { heading, day } => {
            let weekday = parse_weekday(day)?;
            let points: Vec<HourlyPoint> = hourly_trip_times(&data, heading, weekday)?
                .into_iter()
                .filter_map(|(hour, times)| {
                    Some(HourlyPoint {
                        day: day.clone(),
                        hour,
                        avg_trip_time: mean(&times)?,
                    })
                })
                .collect();
            out.table(&points)?;
        }
        Commands::Busiest { n } => {
            out.table(&analytics.busiest_stops(*n)?)?;
        }
        Commands::Longest { n, by } => {
            let rank = match by {
                Rank::TripTime => RankBy::TripTime,
                Rank::Stops => RankBy::StopCount,
            };
            out.table(&extremes(&data, *n, rank))?;
        }
    }

    info!(cached_queries = analytics.cached_queries(), "Done");
    Ok(())
}

/// Prints results and, for tabular ones, appends them to the CSV export.
struct Emitter<'a> {
    format: Format,
    csv: Option<&'a str>,
}

impl Emitter<'_> {
    fn show<T: Serialize + Debug + ?Sized>(&self, value: &T) -> Result<()> {
        match self.format {
            Format::Json => print_json(&value),
            Format::Pretty => {
                print_pretty(&value);
                Ok(())
            }
        }
    }

    fn table<T: Serialize + Debug>(&self, rows: &[T]) -> Result<()> {
        self.show(rows)?;
        if let Some(path) = self.csv {
            append_records(path, rows)
                .with_context(|| format!("Failed to append results to {path}"))?;
            info!(path, rows = rows.len(), "Results appended");
        }
        Ok(())
    }
}
