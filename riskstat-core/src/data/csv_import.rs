//! CSV directory provider.
//!
//! Reads price histories exported by spreadsheet tools or a previous Yahoo
//! download. Layout: `{dir}/{SYMBOL}_{interval}.csv`, falling back to
//! `{dir}/{SYMBOL}.csv`. The file needs a date column (`date` / `Date`) and
//! an adjusted close column (`adj_close` / `Adj Close`); a plain `close`
//! column is used when no adjusted one exists.

use super::provider::{finish_series, validate_symbol, DataSource, FetchError, PriceSeriesProvider};
use crate::domain::{Interval, PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const DATE_COLUMNS: &[&str] = &["date", "datetime", "timestamp"];
const PRICE_COLUMNS: &[&str] = &["adj_close", "adj close", "adjclose", "adjusted_close", "close"];

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// First existing candidate file for `symbol` at `interval`.
    fn resolve(&self, symbol: &str, interval: Interval) -> Option<PathBuf> {
        [
            self.dir.join(format!("{symbol}_{interval}.csv")),
            self.dir.join(format!("{symbol}.csv")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// Parse one CSV file into adjusted-close rows.
    fn read_file(path: &Path, symbol: &str) -> Result<PriceSeries, FetchError> {
        let import_err = |reason: String| FetchError::Import {
            path: path.display().to_string(),
            reason,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| import_err(e.to_string()))?;

        let headers = rdr.headers().map_err(|e| import_err(e.to_string()))?.clone();
        let date_idx =
            find_column(&headers, DATE_COLUMNS).ok_or_else(|| import_err("no date column".into()))?;
        let price_idx = find_column(&headers, PRICE_COLUMNS)
            .ok_or_else(|| import_err("no adjusted close or close column".into()))?;

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| import_err(e.to_string()))?;
            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date)
                .ok_or_else(|| import_err(format!("row {}: bad date {raw_date:?}", line + 2)))?;
            let value = record
                .get(price_idx)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            rows.push(PricePoint::new(date, value));
        }

        finish_series(symbol, rows)
    }
}

/// Header lookup preferring earlier names in `names`.
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl PriceSeriesProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError> {
        let symbol = validate_symbol(symbol)?;
        let path = self.resolve(symbol, interval).ok_or_else(|| FetchError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        tracing::debug!(symbol, path = %path.display(), "reading csv");
        Self::read_file(&path, symbol)
    }
}
