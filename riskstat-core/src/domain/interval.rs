//! Sampling interval passed through to price providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bar interval requested from a provider.
///
/// The core never interprets this beyond handing it to the provider; the
/// per-period risk-free rate assumes daily sampling whatever is chosen here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "5d")]
    FiveDay,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
    #[serde(rename = "3mo")]
    Quarterly,
}

impl Interval {
    pub const ALL: [Interval; 5] = [
        Interval::Daily,
        Interval::FiveDay,
        Interval::Weekly,
        Interval::Monthly,
        Interval::Quarterly,
    ];

    /// Wire code understood by the Yahoo chart API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::FiveDay => "5d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
            Interval::Quarterly => "3mo",
        }
    }

    /// Calendar days between synthetic samples.
    pub fn step_days(&self) -> i64 {
        match self {
            Interval::Daily => 1,
            Interval::FiveDay => 5,
            Interval::Weekly => 7,
            Interval::Monthly => 30,
            Interval::Quarterly => 91,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interval '{0}' (expected one of 1d, 5d, 1wk, 1mo, 3mo)")]
pub struct IntervalParseError(pub String);

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IntervalParseError(s.to_string()))
    }
}
