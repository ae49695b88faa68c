//! Price and return series: the fundamental market data units.

use chrono::NaiveDate;

/// One adjusted-close observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Returns true if the value is NaN or infinite (provider gap).
    pub fn is_void(&self) -> bool {
        !self.value.is_finite()
    }
}

/// Adjusted-close history for one symbol.
///
/// Dates are strictly ascending. Arbitrary input goes through
/// [`PriceSeries::canonicalize`], which sorts and de-duplicates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by date and keep the last observation for any repeated date.
    ///
    /// Providers call this on raw rows; the last row for a date wins because
    /// vendors append corrections after the original print.
    pub fn canonicalize(mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps input order among equal dates.
        points.sort_by_key(|p| p.date);
        let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => out.push(p),
            }
        }
        Self { points: out }
    }

    /// Convenience for tests and fixtures: `(date, value)` pairs in any order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::canonicalize(
            pairs
                .into_iter()
                .map(|(date, value)| PricePoint::new(date, value))
                .collect(),
        )
    }

    /// Callers guarantee strictly ascending dates.
    pub(crate) fn from_sorted(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    /// Observations in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Prices in date order, void entries included.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Earliest observation date; `None` for an empty series.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Value on `date`, if present.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }
}

/// One period-over-period return. `None` when the prior price was zero or void.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Fractional returns derived from a [`PriceSeries`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap points already in date order. Entries may be undefined.
    pub fn from_points(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    /// Build from plain values, dated consecutively from 2000-01-01.
    ///
    /// Estimators pair by position, so the dates only matter for display.
    pub fn from_values(values: &[f64]) -> Self {
        let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        Self {
            points: values
                .iter()
                .zip(base.iter_days())
                .map(|(&v, date)| ReturnPoint {
                    date,
                    value: Some(v),
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Defined, finite return values in date order.
    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value)
            .filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn canonicalize_sorts_and_keeps_last_duplicate() {
        let s = PriceSeries::from_pairs(vec![
            (d("2024-01-04"), 3.0),
            (d("2024-01-02"), 1.0),
            (d("2024-01-04"), 4.0),
        ]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(d("2024-01-02")), Some(1.0));
        assert_eq!(s.get(d("2024-01-04")), Some(4.0));
        assert_eq!(s.first_date(), Some(d("2024-01-02")));
    }

    #[test]
    fn get_missing_date_is_none() {
        let s = PriceSeries::from_pairs(vec![(d("2024-01-02"), 1.0)]);
        assert_eq!(s.get(d("2024-01-03")), None);
    }

    #[test]
    fn defined_values_skips_undefined_and_nan() {
        let r = ReturnSeries::from_points(vec![
            ReturnPoint { date: d("2024-01-02"), value: Some(0.1) },
            ReturnPoint { date: d("2024-01-03"), value: None },
            ReturnPoint { date: d("2024-01-04"), value: Some(f64::NAN) },
            ReturnPoint { date: d("2024-01-05"), value: Some(-0.2) },
        ]);
        let v: Vec<f64> = r.defined_values().collect();
        assert_eq!(v, vec![0.1, -0.2]);
    }
}
