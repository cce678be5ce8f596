//! CLI entry point for the Form 127 metrics tool.
//!
//! Provides one subcommand per dashboard view: grouped summaries, peer
//! benchmarking, trend lines, distributions, scatter plots, and rankings.
//! Every subcommand loads the dataset, applies the shared filter flags, and
//! hands a filtered view to the corresponding report builder.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use form127_metrics::analytics::aggregate::{Aggregation, GroupBy};
use form127_metrics::analytics::filter::{ActivityWindow, RecordFilter};
use form127_metrics::analytics::growth::OutlierPolicy;
use form127_metrics::analytics::metric::Metric;
use form127_metrics::analytics::report;
use form127_metrics::dataset;
use form127_metrics::output::{append_rows, log_json, write_json};
use form127_metrics::record::{HubSize, Record, YearPolicy};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "form127_metrics")]
#[command(about = "Derived metrics over FAA Form 127 airport financial data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Dataset source and record filters shared by every subcommand.
#[derive(Args)]
struct SelectArgs {
    /// Dataset file path or URL (JSON, optionally gzipped).
    /// Falls back to the FORM127_DATA_URL environment variable.
    #[arg(long)]
    data: Option<String>,

    /// Fiscal years to keep (comma-separated)
    #[arg(long, value_delimiter = ',')]
    years: Vec<u16>,

    /// States to keep (comma-separated two-letter codes)
    #[arg(long, value_delimiter = ',')]
    states: Vec<String>,

    /// Hub-size classes to keep (large, medium, small, nonhub)
    #[arg(long, value_delimiter = ',')]
    hubs: Vec<HubSize>,

    /// Trailing activity window in years; 0 disables the screen
    #[arg(long, default_value_t = 3)]
    active_window: u16,
}

impl SelectArgs {
    fn source(&self) -> Result<String> {
        self.data
            .clone()
            .or_else(|| std::env::var("FORM127_DATA_URL").ok())
            .context("no dataset source: pass --data or set FORM127_DATA_URL")
    }

    fn filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new();
        if !self.years.is_empty() {
            filter = filter.years(self.years.iter().copied());
        }
        if !self.states.is_empty() {
            filter = filter.states(&self.states);
        }
        if !self.hubs.is_empty() {
            filter = filter.hub_sizes(self.hubs.iter().copied());
        }
        if self.active_window > 0 {
            filter = filter.active(ActivityWindow {
                metric: Metric::Enplanements,
                window: self.active_window,
            });
        }
        filter
    }

    /// Loads, normalizes, and filters the dataset.
    async fn load(&self) -> Result<Vec<Record>> {
        let records = dataset::load(&self.source()?, &YearPolicy::default()).await?;
        Ok(records)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grouped aggregate of one metric
    Summary {
        #[command(flatten)]
        select: SelectArgs,

        #[arg(long)]
        metric: Metric,

        /// Reduction to apply within each group
        #[arg(long, default_value = "mean")]
        agg: Aggregation,

        /// Partitioning key: year, hub, or state
        #[arg(long, default_value = "year")]
        group_by: GroupBy,

        /// CSV file to append group rows to; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// One airport against its peer group for a fiscal year (radar data)
    Benchmark {
        #[command(flatten)]
        select: SelectArgs,

        /// Airport location identifier (e.g. BNA)
        #[arg(long)]
        airport: String,

        #[arg(long)]
        year: u16,

        /// Metrics to score (comma-separated); defaults to the ratio set
        #[arg(long, value_delimiter = ',')]
        metrics: Vec<Metric>,

        /// Peer reduction: mean or median
        #[arg(long, default_value = "median")]
        agg: Aggregation,

        /// JSON file to write; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// One airport's metric across fiscal years with peer growth comparison
    Trend {
        #[command(flatten)]
        select: SelectArgs,

        #[arg(long)]
        airport: String,

        #[arg(long)]
        metric: Metric,

        /// Growth magnitude above which a rate is flagged as an outlier
        /// (5.0 = 500%)
        #[arg(long, default_value_t = 5.0)]
        max_growth: f64,

        /// Minimum prior-period magnitude for ratio-metric growth
        #[arg(long, default_value_t = 0.01)]
        min_base: f64,

        /// JSON file to write; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Histogram of a metric with percentile markers
    Distribution {
        #[command(flatten)]
        select: SelectArgs,

        #[arg(long)]
        metric: Metric,

        #[arg(long, default_value_t = 10)]
        bins: usize,

        /// Percentile markers to draw (comma-separated, 0-100)
        #[arg(long, value_delimiter = ',', default_value = "25,50,75")]
        percentiles: Vec<f64>,

        /// Airport to highlight on the distribution
        #[arg(long)]
        highlight: Option<String>,

        /// Bin distance at which marker labels merge
        #[arg(long, default_value_t = 1)]
        collision_gap: usize,

        /// JSON file to write; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// X/Y metric points per airport with percentile quadrant lines
    Scatter {
        #[command(flatten)]
        select: SelectArgs,

        #[arg(long)]
        x_metric: Metric,

        #[arg(long)]
        y_metric: Metric,

        /// Percentile for the quadrant reference lines
        #[arg(long, default_value_t = 50.0)]
        percentile: f64,

        /// JSON file to write; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Top or bottom airports by metric value
    Rank {
        #[command(flatten)]
        select: SelectArgs,

        #[arg(long)]
        metric: Metric,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Rank ascending (bottom of the table) instead of descending
        #[arg(long, default_value_t = false)]
        bottom: bool,

        /// CSV file to append rank rows to; logs JSON when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/form127_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("form127_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            select,
            metric,
            agg,
            group_by,
            output,
        } => {
            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::summary(&view, metric, agg, group_by);
            info!(groups = report.rows.len(), %metric, %agg, "Summary computed");
            match output {
                Some(path) => append_rows(&path, &report.rows)?,
                None => log_json(&report)?,
            }
        }
        Commands::Benchmark {
            select,
            airport,
            year,
            metrics,
            agg,
            output,
        } => {
            let metrics = if metrics.is_empty() {
                vec![
                    Metric::RevenuePerEnplanement,
                    Metric::CostPerEnplanement,
                    Metric::DebtPerEnplanement,
                    Metric::DaysCashOnHand,
                    Metric::OperatingMargin,
                    Metric::NonAeroShare,
                ]
            } else {
                metrics
            };
            let airport = airport.to_ascii_uppercase();

            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::benchmark(&view, &airport, year, &metrics, agg)
                .with_context(|| format!("no record for {airport} in fiscal year {year}"))?;
            info!(%airport, year, metrics = report.rows.len(), "Benchmark computed");
            emit(&report, output)?;
        }
        Commands::Trend {
            select,
            airport,
            metric,
            max_growth,
            min_base,
            output,
        } => {
            let airport = airport.to_ascii_uppercase();
            let policy = OutlierPolicy {
                min_base_magnitude: min_base,
                max_growth_magnitude: max_growth,
            };

            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::trend(&view, &airport, metric, &policy)
                .with_context(|| format!("no records for {airport} after filtering"))?;
            info!(%airport, %metric, years = report.points.len(), "Trend computed");
            emit(&report, output)?;
        }
        Commands::Distribution {
            select,
            metric,
            bins,
            percentiles,
            highlight,
            collision_gap,
            output,
        } => {
            let highlight = highlight.map(|h| h.to_ascii_uppercase());

            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::distribution(
                &view,
                metric,
                bins,
                &percentiles,
                highlight.as_deref(),
                collision_gap,
            );
            info!(%metric, count = report.count, bins, "Distribution computed");
            emit(&report, output)?;
        }
        Commands::Scatter {
            select,
            x_metric,
            y_metric,
            percentile,
            output,
        } => {
            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::scatter(&view, x_metric, y_metric, percentile);
            info!(%x_metric, %y_metric, points = report.points.len(), "Scatter computed");
            emit(&report, output)?;
        }
        Commands::Rank {
            select,
            metric,
            limit,
            bottom,
            output,
        } => {
            let records = select.load().await?;
            let view = select.filter().apply(&records);
            let report = report::rank(&view, metric, limit, bottom);
            info!(%metric, rows = report.rows.len(), bottom, "Ranking computed");
            match output {
                Some(path) => append_rows(&path, &report.rows)?,
                None => log_json(&report)?,
            }
        }
    }

    Ok(())
}

/// Writes a report to a JSON file when a path is given, otherwise logs it.
fn emit<T: serde::Serialize>(report: &T, output: Option<String>) -> Result<()> {
    match output {
        Some(path) => write_json(&path, report),
        None => log_json(report),
    }
}
