//! Price-series provider trait and structured fetch errors.
//!
//! The PriceSeriesProvider trait abstracts over data sources (Yahoo Finance,
//! CSV directory import, synthetic walks) so the pipeline can swap them and
//! tests can mock them.

use crate::domain::{Interval, PricePoint, PriceSeries};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a symbol's history could not be fetched.
///
/// The pipeline treats every variant the same way ("ticker failed"); the
/// distinction is for the log and the summary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach provider: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("provider rate limit hit, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected provider response: {0}")]
    ResponseFormatChanged(String),

    #[error("provider wants authentication: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("provider is refusing requests (circuit breaker open)")]
    CircuitBreakerTripped,

    #[error("import error in {path}: {reason}")]
    Import { path: String, reason: String },

    #[error("fetch error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Source of adjusted-close histories.
///
/// Implementations return the full available history for the symbol at the
/// requested interval, ascending by date with unique dates.
pub trait PriceSeriesProvider: Send + Sync {
    /// Short provider label used in logs and messages.
    fn name(&self) -> &str;

    /// Provenance tag for series returned by this provider.
    fn source(&self) -> DataSource;

    /// Fetch the full adjusted-close history for `symbol`.
    fn fetch(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError>;
}

impl<P: PriceSeriesProvider + ?Sized> PriceSeriesProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn source(&self) -> DataSource {
        (**self).source()
    }

    fn fetch(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError> {
        (**self).fetch(symbol, interval)
    }
}

/// Reject blank symbols before they reach a data source.
pub fn validate_symbol(symbol: &str) -> Result<&str, FetchError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidSymbol(symbol.to_string()));
    }
    Ok(trimmed)
}

/// Turn raw provider rows into a series: drop rows without a usable price,
/// sort, and de-duplicate dates. An empty result is `SymbolNotFound`.
pub fn finish_series(symbol: &str, rows: Vec<PricePoint>) -> Result<PriceSeries, FetchError> {
    let rows: Vec<PricePoint> = rows.into_iter().filter(|p| !p.is_void()).collect();
    if rows.is_empty() {
        return Err(FetchError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    Ok(PriceSeries::canonicalize(rows))
}

/// Progress callback for multi-symbol runs.
///
/// Called from worker threads, so implementations must be `Sync`.
pub trait FetchProgress: Send + Sync {
    /// Before the fetch for `symbol` (position `index` of `total`) starts.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a fetch completes; `Ok` carries the number of observations.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<usize, &FetchError>);

    /// After every ticker has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: Result<usize, &FetchError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// Progress reporter that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::info!("[{}/{}] fetching {symbol}", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: Result<usize, &FetchError>,
    ) {
        match result {
            Ok(n) => tracing::info!(symbol, observations = n, "fetched"),
            Err(e) => tracing::warn!(symbol, error = %e, "fetch failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!("fetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
