//! RiskStat CLI: annual beta and Sharpe ratio report.
//!
//! Commands:
//! - `run`: compute per-year beta and Sharpe for a ticker list against a benchmark
//! - `fetch`: fetch one series and print its range (provider smoke test)
//! - `show`: print the table and summary of a saved report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use riskstat_core::data::{LogProgress, PriceSeriesProvider};
use riskstat_core::Interval;
use riskstat_runner::{
    build_provider, export_pivot_csv, load_report, save_report, summary_text, ConfigFile,
    MetricsPipeline, PivotTable, PriceSource, SourceConfig,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "riskstat=info,riskstat_core=info,riskstat_runner=info";

#[derive(Parser)]
#[command(
    name = "riskstat",
    about = "RiskStat CLI: per-year beta and Sharpe ratio against a market benchmark"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where prices come from. Overrides the `[source]` table of a config file.
#[derive(Args)]
struct SourceArgs {
    /// Price source: yahoo, csv, or synthetic.
    #[arg(long)]
    source: Option<PriceSource>,

    /// Directory of `{SYMBOL}.csv` files (csv source).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl SourceArgs {
    fn apply(self, source: &mut SourceConfig) {
        if let Some(kind) = self.source {
            source.kind = kind;
        }
        if let Some(dir) = self.data_dir {
            source.data_dir = Some(dir);
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the annual metrics table and write the report.
    Run {
        /// Path to a TOML config file with a `[run]` table.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tickers to evaluate. Replace the config file's list when given.
        tickers: Vec<String>,

        /// Benchmark symbol. Defaults to ^GSPC.
        #[arg(long)]
        benchmark: Option<String>,

        /// Annual risk-free rate, e.g. 0.02.
        #[arg(long = "risk-free")]
        risk_free: Option<f64>,

        /// Sampling interval: 1d, 5d, 1wk, 1mo, 3mo.
        #[arg(long)]
        interval: Option<Interval>,

        #[command(flatten)]
        source: SourceArgs,

        /// Worker threads for fetching and computing tickers.
        #[arg(long)]
        workers: Option<usize>,

        /// Per-fetch timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Output directory for the report artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Fetch one series and print its date range and length.
    Fetch {
        symbol: String,

        #[arg(long, default_value_t = Interval::Daily)]
        interval: Interval,

        #[command(flatten)]
        source: SourceArgs,

        /// Per-fetch timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print the annual table and summary of a report written by `run`.
    Show {
        /// Report directory (the `--output-dir` of an earlier run).
        #[arg(default_value = "results")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            tickers,
            benchmark,
            risk_free,
            interval,
            source,
            workers,
            timeout_secs,
            output_dir,
        } => {
            let mut file = match config {
                Some(path) => ConfigFile::from_file(&path)?,
                None => ConfigFile::default(),
            };
            let run = &mut file.run;
            if !tickers.is_empty() {
                run.tickers = tickers;
            }
            if let Some(b) = benchmark {
                run.benchmark = b;
            }
            if let Some(rf) = risk_free {
                run.risk_free_annual_rate = rf;
            }
            if let Some(i) = interval {
                run.interval = i;
            }
            if let Some(w) = workers {
                run.workers = w;
            }
            if let Some(t) = timeout_secs {
                run.fetch_timeout_secs = t;
            }
            source.apply(&mut file.source);
            run_metrics(file, output_dir)
        }
        Commands::Fetch {
            symbol,
            interval,
            source,
            timeout_secs,
        } => {
            let mut source_config = SourceConfig::default();
            source.apply(&mut source_config);
            run_fetch(&symbol, interval, &source_config, timeout_secs)
        }
        Commands::Show { dir } => run_show(&dir),
    }
}

/// Human-readable logs on stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .init();
}

fn run_metrics(file: ConfigFile, output_dir: PathBuf) -> Result<()> {
    let ConfigFile { run, source } = file;
    run.validate()?;

    let provider = build_provider(&source, run.fetch_timeout())?;
    tracing::info!(source = %source.kind, "price source ready");

    let result = MetricsPipeline::new(&*provider)
        .with_progress(&LogProgress)
        .run(&run)
        .context("metrics run failed")?;

    let dir = save_report(&result, &output_dir)?;

    print!("{}", summary_text(&result));
    println!("Report saved to: {}", dir.display());
    Ok(())
}

fn run_fetch(symbol: &str, interval: Interval, source: &SourceConfig, timeout_secs: u64) -> Result<()> {
    let provider = build_provider(source, std::time::Duration::from_secs(timeout_secs.max(1)))?;
    let series = provider
        .fetch(symbol, interval)
        .with_context(|| format!("failed to fetch {symbol} from {}", provider.name()))?;

    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => println!(
            "{symbol} ({interval}, {}): {} observations, {first} to {last}",
            provider.name(),
            series.len()
        ),
        _ => println!("{symbol}: no observations"),
    }
    Ok(())
}

fn run_show(dir: &Path) -> Result<()> {
    let result = load_report(dir)?;
    tracing::info!(
        dir = %dir.display(),
        benchmark = %result.benchmark,
        records = result.records.len(),
        "loaded report"
    );

    print!("{}", export_pivot_csv(&PivotTable::pivot(&result.records))?);
    println!();
    print!("{}", summary_text(&result));
    Ok(())
}
