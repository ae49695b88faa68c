//! Synthetic price provider for offline runs and demos.
//!
//! Every symbol is a random walk driven by one shared market factor plus
//! its own noise, so betas come out spread around one. Seeds are derived
//! from BLAKE3 hashes, so the same symbol always gets the same history.
//! These series are fake and tagged `DataSource::Synthetic`.

use super::provider::{validate_symbol, DataSource, FetchError, PriceSeriesProvider};
use crate::domain::{Interval, PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MARKET_SEED: &str = "riskstat/synthetic/market";

pub struct SyntheticProvider {
    start: NaiveDate,
    end: NaiveDate,
}

impl SyntheticProvider {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn rng_for(label: &str) -> StdRng {
        let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
        StdRng::from_seed(seed)
    }

    /// Sample dates: weekdays only for daily data, fixed steps otherwise.
    fn dates(&self, interval: Interval) -> Vec<NaiveDate> {
        let step = chrono::Duration::days(interval.step_days());
        let mut out = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            let weekend = matches!(current.weekday(), Weekday::Sat | Weekday::Sun);
            if interval != Interval::Daily || !weekend {
                out.push(current);
            }
            current += step;
        }
        out
    }

    fn generate(&self, symbol: &str, interval: Interval) -> PriceSeries {
        let dates = self.dates(interval);
        let mut market = Self::rng_for(MARKET_SEED);
        let mut own = Self::rng_for(symbol);

        let loading: f64 = own.gen_range(0.5..1.5);
        let mut price = own.gen_range(20.0..200.0_f64);

        let points = dates
            .into_iter()
            .map(|date| {
                let common: f64 = market.gen_range(-0.02..0.02);
                let noise: f64 = own.gen_range(-0.015..0.015);
                price *= 1.0 + 0.0003 + loading * common + noise;
                PricePoint::new(date, price)
            })
            .collect();

        PriceSeries::canonicalize(points)
    }
}

impl PriceSeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, interval: Interval) -> Result<PriceSeries, FetchError> {
        let symbol = validate_symbol(symbol)?;
        let series = self.generate(symbol, interval);
        if series.is_empty() {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        )
    }

    #[test]
    fn deterministic_per_symbol() {
        let p = provider();
        let a = p.fetch("AAPL", Interval::Daily).unwrap();
        let b = p.fetch("AAPL", Interval::Daily).unwrap();
        let c = p.fetch("MSFT", Interval::Daily).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn daily_skips_weekends() {
        let s = provider().fetch("SPY", Interval::Daily).unwrap();
        assert!(s
            .dates()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(s.values().all(|v| v > 0.0));
    }

    #[test]
    fn weekly_steps_seven_days() {
        let s = provider().fetch("SPY", Interval::Weekly).unwrap();
        let dates: Vec<_> = s.dates().collect();
        assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 7));
    }

    #[test]
    fn empty_window_is_not_found() {
        let p = SyntheticProvider::new(
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        );
        assert!(matches!(p.fetch("X", Interval::Daily), Err(FetchError::SymbolNotFound { .. })));
    }
}
