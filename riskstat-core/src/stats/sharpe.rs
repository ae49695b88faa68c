//! Per-period Sharpe ratio.

use super::{is_constant, mean};
use crate::domain::ReturnSeries;

/// Periods per year used to de-annualize the risk-free rate.
///
/// Fixed at the daily trading calendar regardless of the sampling interval.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Annual risk-free rate expressed per sampling period.
pub fn per_period_risk_free(annual_rate: f64) -> f64 {
    annual_rate / TRADING_PERIODS_PER_YEAR
}

/// `mean(excess) / pstdev(excess)` where `excess = r - rf`.
///
/// Uses the population standard deviation (denominator n). The ratio is not
/// annualized. Undefined entries are dropped first; returns `None` with
/// fewer than two entries or when the standard deviation is exactly zero.
pub fn sharpe(returns: &ReturnSeries, risk_free_per_period: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let excess: Vec<f64> = returns
        .defined_values()
        .map(|r| r - risk_free_per_period)
        .collect();
    if excess.len() < 2 || is_constant(&excess) {
        return None;
    }

    let mu = mean(&excess);
    let variance = excess.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / excess.len() as f64;
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(mu / std)
}
