//! Market beta.

use super::{is_constant, mean};
use crate::domain::ReturnSeries;

/// `Cov(stock, market) / Var(market)` with the unbiased (n - 1) estimator.
///
/// Inputs are paired by position and expected pre-aligned. A pair where
/// either side is undefined is dropped. Returns `None` with fewer than two
/// usable pairs or when the market variance is exactly zero.
pub fn beta(stock: &ReturnSeries, market: &ReturnSeries) -> Option<f64> {
    if stock.len() < 2 || market.len() < 2 {
        return None;
    }

    let (xs, ms): (Vec<f64>, Vec<f64>) = stock
        .points()
        .iter()
        .zip(market.points())
        .filter_map(|(s, m)| match (s.value, m.value) {
            (Some(s), Some(m)) if s.is_finite() && m.is_finite() => Some((s, m)),
            _ => None,
        })
        .unzip();

    let n = xs.len();
    if n < 2 || is_constant(&ms) {
        return None;
    }

    let x_mean = mean(&xs);
    let m_mean = mean(&ms);
    let denom = (n - 1) as f64;

    let covariance = xs
        .iter()
        .zip(&ms)
        .map(|(x, m)| (x - x_mean) * (m - m_mean))
        .sum::<f64>()
        / denom;
    let market_variance = ms.iter().map(|m| (m - m_mean).powi(2)).sum::<f64>() / denom;

    if market_variance == 0.0 {
        return None;
    }
    Some(covariance / market_variance)
}
