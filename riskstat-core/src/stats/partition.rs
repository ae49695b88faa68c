//! Calendar-year partitioning.

use crate::domain::{PricePoint, PriceSeries, YearKey};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Series split by calendar year, keys ascending. No year maps to an empty series.
pub type PartitionedSeries = BTreeMap<YearKey, PriceSeries>;

/// Group a series by the calendar year of each date.
pub fn partition_by_year(series: &PriceSeries) -> PartitionedSeries {
    let mut groups: BTreeMap<YearKey, Vec<PricePoint>> = BTreeMap::new();
    for p in series.points() {
        groups.entry(p.date.year()).or_default().push(*p);
    }
    groups
        .into_iter()
        .map(|(year, points)| (year, PriceSeries::from_sorted(points)))
        .collect()
}
