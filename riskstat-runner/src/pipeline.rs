//! Metrics pipeline: per ticker, per calendar year, beta and Sharpe.
//!
//! Flow:
//! 1. Fetch the benchmark once and split it by year (shared, read-only).
//! 2. For each ticker, on a fixed worker pool: fetch, split by year, and for
//!    every year the ticker has data align against the benchmark year,
//!    derive returns, and run both estimators.
//! 3. Collect outcomes in input order and sort records by ticker, year,
//!    metric so output does not depend on scheduling.
//!
//! A failed fetch marks the ticker failed and produces no records. A year
//! that cannot be aligned is skipped. Neither aborts the batch; only an
//! empty ticker list or a failed benchmark fetch does.

use rayon::prelude::*;
use riskstat_core::data::{FetchError, FetchProgress, NoProgress, PriceSeriesProvider};
use riskstat_core::stats::{self, PartitionedSeries};
use riskstat_core::{Interval, MetricName, MetricRecord, PriceSeries, YearKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("benchmark '{symbol}' could not be fetched: {source}")]
    BenchmarkFetch {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("benchmark '{symbol}' has no observations")]
    EmptyBenchmark { symbol: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Why one (ticker, year) produced no records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearError {
    #[error("benchmark has no data in {year}")]
    NoBenchmarkYear { year: YearKey },

    #[error("no dates in {year} shared with the benchmark")]
    AlignmentEmpty { year: YearKey },
}

/// Estimates for one (ticker, year).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMetrics {
    pub year: YearKey,
    /// Common dates after alignment.
    pub observations: usize,
    pub beta: Option<f64>,
    pub sharpe: Option<f64>,
}

impl YearMetrics {
    /// The two records for this year, Beta first. Undefined values are kept.
    pub fn records(&self, ticker: &str) -> [MetricRecord; 2] {
        [
            MetricRecord::new(ticker, self.year, MetricName::Beta, self.beta),
            MetricRecord::new(ticker, self.year, MetricName::SharpeRatio, self.sharpe),
        ]
    }
}

/// Align one year of a ticker against the benchmark and estimate both metrics.
pub fn year_metrics(
    year: YearKey,
    stock_year: &PriceSeries,
    market_year: Option<&PriceSeries>,
    risk_free_per_period: f64,
) -> Result<YearMetrics, YearError> {
    let market_year = market_year
        .filter(|m| !m.is_empty())
        .ok_or(YearError::NoBenchmarkYear { year })?;

    let (stock, market) = stats::align(stock_year, market_year);
    if stock.is_empty() || market.is_empty() {
        return Err(YearError::AlignmentEmpty { year });
    }

    let stock_returns = stats::returns(&stock);
    let market_returns = stats::returns(&market);

    Ok(YearMetrics {
        year,
        observations: stock.len(),
        beta: stats::beta(&stock_returns, &market_returns),
        sharpe: stats::sharpe(&stock_returns, risk_free_per_period),
    })
}

/// A ticker whose fetch failed, with the reason for the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: String,
}

/// Everything a run produces.
///
/// Every processed ticker is in exactly one of `succeeded` / `failed`. A
/// succeeded ticker can still have no records if no year lined up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub benchmark: String,
    pub interval: Interval,
    pub risk_free_annual_rate: f64,
    pub risk_free_per_period: f64,
    /// Sorted by ticker, then year, then metric.
    pub records: Vec<MetricRecord>,
    /// In input order.
    pub succeeded: Vec<String>,
    /// In input order.
    pub failed: Vec<TickerFailure>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl PipelineResult {
    pub fn failed_tickers(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|f| f.ticker.as_str())
    }

    pub fn records_for<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a MetricRecord> + 'a {
        self.records.iter().filter(move |r| r.ticker == ticker)
    }

    /// Value for (ticker, year, metric); outer `None` when no record exists.
    pub fn value(&self, ticker: &str, year: YearKey, metric: MetricName) -> Option<Option<f64>> {
        self.records
            .iter()
            .find(|r| r.ticker == ticker && r.year == year && r.metric == metric)
            .map(|r| r.value)
    }
}

enum TickerOutcome {
    Fetched {
        ticker: String,
        records: Vec<MetricRecord>,
    },
    FetchFailed {
        ticker: String,
        error: FetchError,
    },
}

/// Runs the per-ticker, per-year computation against one provider.
pub struct MetricsPipeline<'a> {
    provider: &'a dyn PriceSeriesProvider,
    progress: &'a dyn FetchProgress,
}

impl<'a> MetricsPipeline<'a> {
    pub fn new(provider: &'a dyn PriceSeriesProvider) -> Self {
        Self {
            provider,
            progress: &NoProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn FetchProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Run the whole batch described by `config`.
    pub fn run(&self, config: &RunConfig) -> Result<PipelineResult, PipelineError> {
        config.validate()?;
        let tickers = config.normalized_tickers();
        if tickers.is_empty() {
            return Err(ConfigError::NoTickers.into());
        }

        let benchmark = config.benchmark_symbol().to_string();
        let rf = config.risk_free_per_period();
        tracing::info!(
            tickers = tickers.len(),
            benchmark = %benchmark,
            interval = %config.interval,
            provider = self.provider.name(),
            workers = config.workers,
            "starting metrics run"
        );

        let market = self
            .provider
            .fetch(&benchmark, config.interval)
            .map_err(|source| PipelineError::BenchmarkFetch {
                symbol: benchmark.clone(),
                source,
            })?;
        if market.is_empty() {
            return Err(PipelineError::EmptyBenchmark { symbol: benchmark });
        }
        tracing::info!(
            benchmark = %benchmark,
            observations = market.len(),
            first = ?market.first_date(),
            last = ?market.last_date(),
            "benchmark loaded"
        );
        let market_by_year = stats::partition_by_year(&market);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let total = tickers.len();
        let outcomes: Vec<TickerOutcome> = pool.install(|| {
            tickers
                .par_iter()
                .enumerate()
                .map(|(i, ticker)| self.process_ticker(ticker, i, total, &market_by_year, config.interval, rf))
                .collect()
        });

        let mut records = Vec::new();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome {
                TickerOutcome::Fetched {
                    ticker,
                    records: ticker_records,
                } => {
                    records.extend(ticker_records);
                    succeeded.push(ticker);
                }
                TickerOutcome::FetchFailed { ticker, error } => failed.push(TickerFailure {
                    ticker,
                    reason: error.to_string(),
                }),
            }
        }
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        self.progress
            .on_batch_complete(succeeded.len(), failed.len(), total);
        tracing::info!(
            succeeded = succeeded.len(),
            failed = failed.len(),
            records = records.len(),
            "metrics run complete"
        );

        Ok(PipelineResult {
            schema_version: SCHEMA_VERSION,
            benchmark,
            interval: config.interval,
            risk_free_annual_rate: config.risk_free_annual_rate,
            risk_free_per_period: rf,
            records,
            succeeded,
            failed,
        })
    }

    fn process_ticker(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        market_by_year: &PartitionedSeries,
        interval: Interval,
        rf: f64,
    ) -> TickerOutcome {
        self.progress.on_start(ticker, index, total);

        let series = match self.provider.fetch(ticker, interval) {
            Ok(series) => series,
            Err(error) => {
                self.progress.on_complete(ticker, index, total, Err(&error));
                return TickerOutcome::FetchFailed {
                    ticker: ticker.to_string(),
                    error,
                };
            }
        };
        self.progress
            .on_complete(ticker, index, total, Ok(series.len()));

        let mut records = Vec::new();
        for (year, stock_year) in stats::partition_by_year(&series) {
            match year_metrics(year, &stock_year, market_by_year.get(&year), rf) {
                Ok(metrics) => {
                    tracing::debug!(
                        ticker,
                        year,
                        observations = metrics.observations,
                        beta = ?metrics.beta,
                        sharpe = ?metrics.sharpe,
                        "year computed"
                    );
                    records.extend(metrics.records(ticker));
                }
                Err(e) => tracing::debug!(ticker, year, reason = %e, "year skipped"),
            }
        }

        TickerOutcome::Fetched {
            ticker: ticker.to_string(),
            records,
        }
    }
}

/// Convenience wrapper: run `config` against `provider` without progress reporting.
pub fn run_pipeline(
    provider: &dyn PriceSeriesProvider,
    config: &RunConfig,
) -> Result<PipelineResult, PipelineError> {
    MetricsPipeline::new(provider).run(config)
}
