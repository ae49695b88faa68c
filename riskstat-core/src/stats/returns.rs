//! Period-over-period returns.

use crate::domain::{PriceSeries, ReturnPoint, ReturnSeries};

/// Fractional return `value_i / value_{i-1} - 1`, dated at `i`.
///
/// The first observation has no prior and produces nothing, so the output is
/// one shorter than the input (empty below two points). A zero or void prior
/// yields an undefined entry rather than an infinity.
pub fn returns(series: &PriceSeries) -> ReturnSeries {
    let points = series
        .points()
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            let value = if prev.is_void() || prev.value == 0.0 || cur.is_void() {
                None
            } else {
                Some(cur.value / prev.value - 1.0)
            };
            ReturnPoint {
                date: cur.date,
                value,
            }
        })
        .collect();
    ReturnSeries::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        PriceSeries::from_pairs(values.iter().zip(base.iter_days()).map(|(&v, d)| (d, v)))
    }

    #[test]
    fn simple_returns() {
        let r = returns(&series(&[100.0, 110.0, 121.0]));
        assert_eq!(r.len(), 2);
        for v in r.defined_values() {
            assert!((v - 0.10).abs() < 1e-12);
        }
        assert_eq!(r.points()[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    }

    #[test]
    fn short_input_is_empty() {
        assert!(returns(&series(&[])).is_empty());
        assert!(returns(&series(&[100.0])).is_empty());
    }

    #[test]
    fn zero_prior_is_undefined() {
        let r = returns(&series(&[0.0, 10.0, 11.0]));
        assert_eq!(r.len(), 2);
        assert_eq!(r.points()[0].value, None);
        assert!((r.points()[1].value.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn void_prices_are_undefined() {
        let r = returns(&series(&[10.0, f64::NAN, 11.0]));
        assert_eq!(r.points()[0].value, None);
        assert_eq!(r.points()[1].value, None);
    }
}
