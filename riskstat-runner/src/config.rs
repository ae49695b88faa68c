//! Run configuration, loaded from TOML and overridable from the CLI.
//!
//! ```toml
//! [run]
//! tickers = ["AAPL", "MSFT"]
//! benchmark = "^GSPC"
//! risk_free_annual_rate = 0.02
//! interval = "1d"
//! workers = 4
//! fetch_timeout_secs = 30
//!
//! [source]
//! kind = "yahoo"          # yahoo | csv | synthetic
//! data_dir = "data"       # csv only
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use riskstat_core::stats::per_period_risk_free;
use riskstat_core::Interval;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::SourceConfig;

pub const DEFAULT_BENCHMARK: &str = "^GSPC";
pub const DEFAULT_RISK_FREE_ANNUAL_RATE: f64 = 0.02;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no tickers configured (blank entries are ignored)")]
    NoTickers,

    #[error("benchmark symbol is blank")]
    BlankBenchmark,

    #[error("risk-free rate must be finite, got {0}")]
    InvalidRiskFreeRate(f64),

    #[error("workers must be at least 1")]
    ZeroWorkers,

    #[error("fetch timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("price source: {0}")]
    Source(String),
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Tickers to evaluate. Blank entries are dropped, duplicates collapsed.
    #[serde(default)]
    pub tickers: Vec<String>,

    /// Market benchmark every ticker is measured against.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// Annual risk-free rate, de-annualized with a fixed 252 periods.
    #[serde(default = "default_risk_free")]
    pub risk_free_annual_rate: f64,

    /// Sampling interval handed to the provider.
    #[serde(default)]
    pub interval: Interval,

    /// Worker threads for per-ticker fetch and compute.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_benchmark() -> String {
    DEFAULT_BENCHMARK.to_string()
}

fn default_risk_free() -> f64 {
    DEFAULT_RISK_FREE_ANNUAL_RATE
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            benchmark: default_benchmark(),
            risk_free_annual_rate: default_risk_free(),
            interval: Interval::default(),
            workers: default_workers(),
            fetch_timeout_secs: default_timeout(),
        }
    }
}

impl RunConfig {
    pub fn new<I, S>(tickers: I, benchmark: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            benchmark: benchmark.into(),
            ..Self::default()
        }
    }

    /// Trimmed tickers, blanks dropped, first occurrence of duplicates kept.
    pub fn normalized_tickers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.tickers.len());
        for (i, raw) in self.tickers.iter().enumerate() {
            let t = raw.trim();
            if t.is_empty() {
                tracing::warn!(position = i, "ignoring blank ticker entry");
                continue;
            }
            if seen.insert(t.to_string()) {
                out.push(t.to_string());
            } else {
                tracing::debug!(ticker = t, "ignoring duplicate ticker");
            }
        }
        out
    }

    pub fn benchmark_symbol(&self) -> &str {
        self.benchmark.trim()
    }

    pub fn risk_free_per_period(&self) -> f64 {
        per_period_risk_free(self.risk_free_annual_rate)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Checks that do not depend on the provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::NoTickers);
        }
        if self.benchmark_symbol().is_empty() {
            return Err(ConfigError::BlankBenchmark);
        }
        if !self.risk_free_annual_rate.is_finite() {
            return Err(ConfigError::InvalidRiskFreeRate(self.risk_free_annual_rate));
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// On-disk layout: a `[run]` table and an optional `[source]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
