//! Metric records: the atomic output of the pipeline.

use super::YearKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which statistic a record holds.
///
/// Ordering is the report ordering: Beta rows before Sharpe Ratio rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricName {
    #[serde(rename = "Beta")]
    Beta,
    #[serde(rename = "Sharpe Ratio")]
    SharpeRatio,
}

impl MetricName {
    pub fn label(&self) -> &'static str {
        match self {
            MetricName::Beta => "Beta",
            MetricName::SharpeRatio => "Sharpe Ratio",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (ticker, year, metric) value. `None` means the statistic was
/// undefined for that year (too few points or a zero denominator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub ticker: String,
    pub year: YearKey,
    pub metric: MetricName,
    pub value: Option<f64>,
}

impl MetricRecord {
    pub fn new(ticker: impl Into<String>, year: YearKey, metric: MetricName, value: Option<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            year,
            metric,
            value,
        }
    }

    /// Sort key used for reproducible output.
    pub fn sort_key(&self) -> (&str, YearKey, MetricName) {
        (&self.ticker, self.year, self.metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_sorts_before_sharpe() {
        assert!(MetricName::Beta < MetricName::SharpeRatio);
    }

    #[test]
    fn undefined_value_serializes_as_null() {
        let r = MetricRecord::new("AAPL", 2020, MetricName::SharpeRatio, None);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"value\":null"));
        assert!(json.contains("\"metric\":\"Sharpe Ratio\""));
    }
}
