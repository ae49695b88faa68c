//! Price source selection: turns configuration into a provider.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use riskstat_core::data::{
    CircuitBreaker, CsvDirProvider, PriceSeriesProvider, SyntheticProvider, YahooProvider,
};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Which provider backs a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Yahoo => "yahoo",
            PriceSource::Csv => "csv",
            PriceSource::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(PriceSource::Yahoo),
            "csv" => Ok(PriceSource::Csv),
            "synthetic" => Ok(PriceSource::Synthetic),
            other => Err(ConfigError::Source(format!(
                "unknown source '{other}' (expected yahoo, csv, or synthetic)"
            ))),
        }
    }
}

/// The `[source]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: PriceSource,

    /// Directory of `{SYMBOL}.csv` files. Defaults to `./data`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Synthetic history window. Defaults to 2019-01-01..=2023-12-31.
    #[serde(default)]
    pub synthetic_start: Option<NaiveDate>,
    #[serde(default)]
    pub synthetic_end: Option<NaiveDate>,
}

impl SourceConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"))
    }

    fn synthetic_window(&self) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        let start = self
            .synthetic_start
            .or_else(|| NaiveDate::from_ymd_opt(2019, 1, 1))
            .ok_or_else(|| ConfigError::Source("invalid synthetic start".into()))?;
        let end = self
            .synthetic_end
            .or_else(|| NaiveDate::from_ymd_opt(2023, 12, 31))
            .ok_or_else(|| ConfigError::Source("invalid synthetic end".into()))?;
        if end < start {
            return Err(ConfigError::Source(format!(
                "synthetic window ends ({end}) before it starts ({start})"
            )));
        }
        Ok((start, end))
    }
}

/// Build the provider selected by `source`.
///
/// `timeout` bounds every network request; it has no effect on local sources.
pub fn build_provider(
    source: &SourceConfig,
    timeout: Duration,
) -> Result<Box<dyn PriceSeriesProvider>, ConfigError> {
    match source.kind {
        PriceSource::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::for_yahoo());
            let provider =
                YahooProvider::new(breaker, timeout).map_err(|e| ConfigError::Source(e.to_string()))?;
            Ok(Box::new(provider))
        }
        PriceSource::Csv => {
            let dir = source.data_dir();
            if !dir.is_dir() {
                return Err(ConfigError::Source(format!(
                    "csv data directory not found: {}",
                    dir.display()
                )));
            }
            Ok(Box::new(CsvDirProvider::new(dir)))
        }
        PriceSource::Synthetic => {
            let (start, end) = source.synthetic_window()?;
            Ok(Box::new(SyntheticProvider::new(start, end)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskstat_core::data::DataSource;

    #[test]
    fn parse_source_names() {
        assert_eq!("Yahoo".parse::<PriceSource>().unwrap(), PriceSource::Yahoo);
        assert_eq!("csv".parse::<PriceSource>().unwrap(), PriceSource::Csv);
        assert_eq!(" synthetic ".parse::<PriceSource>().unwrap(), PriceSource::Synthetic);
        assert!("parquet".parse::<PriceSource>().is_err());
    }

    #[test]
    fn builds_synthetic_provider() {
        let cfg = SourceConfig {
            kind: PriceSource::Synthetic,
            ..SourceConfig::default()
        };
        let p = build_provider(&cfg, Duration::from_secs(1)).unwrap();
        assert_eq!(p.source(), DataSource::Synthetic);
    }

    #[test]
    fn csv_requires_existing_directory() {
        let cfg = SourceConfig {
            kind: PriceSource::Csv,
            data_dir: Some(PathBuf::from("/definitely/not/here")),
            ..SourceConfig::default()
        };
        assert!(matches!(
            build_provider(&cfg, Duration::from_secs(1)),
            Err(ConfigError::Source(_))
        ));
    }

    #[test]
    fn inverted_synthetic_window_is_rejected() {
        let cfg = SourceConfig {
            kind: PriceSource::Synthetic,
            synthetic_start: NaiveDate::from_ymd_opt(2022, 1, 1),
            synthetic_end: NaiveDate::from_ymd_opt(2021, 1, 1),
            ..SourceConfig::default()
        };
        assert!(build_provider(&cfg, Duration::from_secs(1)).is_err());
    }
}
