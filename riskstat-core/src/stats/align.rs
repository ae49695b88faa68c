//! Two-series date alignment.
//!
//! Restricts a pair of series to the dates both of them carry a usable value
//! for. Nothing is forward-filled.

use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Restrict `a` and `b` to their common dates.
///
/// `a` is first reindexed onto `b`'s dates and void entries dropped; `b` is
/// then reindexed onto what is left of `a` and void entries dropped. The
/// result holds exactly the dates where both sides have a finite value,
/// in ascending order, with values untouched. Empty in, empty out.
pub fn align(a: &PriceSeries, b: &PriceSeries) -> (PriceSeries, PriceSeries) {
    if a.is_empty() || b.is_empty() {
        return (PriceSeries::new(), PriceSeries::new());
    }

    // Void index entries are skipped too, so a date where `b` is void never
    // survives into `a_kept` and both sides end with one date set.
    let a_kept = reindex_dropping_void(a, b.points());
    let b_kept = reindex_dropping_void(b, &a_kept);

    (
        PriceSeries::from_sorted(a_kept),
        PriceSeries::from_sorted(b_kept),
    )
}

/// Look up each of `index`'s dates in `source`, keeping finite hits.
fn reindex_dropping_void(source: &PriceSeries, index: &[PricePoint]) -> Vec<PricePoint> {
    let by_date: HashMap<NaiveDate, f64> = source.points().iter().map(|p| (p.date, p.value)).collect();

    index
        .iter()
        .filter(|p| !p.is_void())
        .filter_map(|p| by_date.get(&p.date).map(|&value| PricePoint::new(p.date, value)))
        .filter(|p| !p.is_void())
        .collect()
}
