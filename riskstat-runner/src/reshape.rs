//! Long-to-wide reshaping of metric records.
//!
//! One row per (ticker, metric), one column per year, the layout the
//! spreadsheet export writes.

use std::collections::{BTreeMap, BTreeSet};

use riskstat_core::{MetricName, MetricRecord, YearKey};
use serde::{Deserialize, Serialize};

/// One (ticker, metric) row; `values[i]` belongs to `PivotTable::years[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub ticker: String,
    pub metric: MetricName,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Every year present in any record, ascending.
    pub years: Vec<YearKey>,
    /// Sorted by ticker, then metric (Beta before Sharpe Ratio).
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Pivot long-form records into the wide table.
    ///
    /// Cells with no record are `None`. If several records share a cell, the
    /// cell holds the mean of their defined values.
    ///
    /// A (ticker, metric) row is kept even when every cell is undefined, so a
    /// ticker whose beta never resolves still shows up in the export. Tools
    /// that drop all-empty rows by default (pandas `pivot_table`) would omit it.
    pub fn pivot(records: &[MetricRecord]) -> Self {
        let years: Vec<YearKey> = records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column: BTreeMap<YearKey, usize> = years.iter().enumerate().map(|(i, &y)| (y, i)).collect();

        // (sum, count) per cell; count 0 with a record present stays undefined.
        let mut cells: BTreeMap<(&str, MetricName), Vec<(f64, usize)>> = BTreeMap::new();
        for r in records {
            let row = cells
                .entry((r.ticker.as_str(), r.metric))
                .or_insert_with(|| vec![(0.0, 0); years.len()]);
            if let (Some(v), Some(&col)) = (r.value, column.get(&r.year)) {
                row[col].0 += v;
                row[col].1 += 1;
            }
        }

        let rows = cells
            .into_iter()
            .map(|((ticker, metric), sums)| PivotRow {
                ticker: ticker.to_string(),
                metric,
                values: sums
                    .into_iter()
                    .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect(),
            })
            .collect();

        Self { years, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup; `None` when the row, the year, or the value is missing.
    pub fn get(&self, ticker: &str, metric: MetricName, year: YearKey) -> Option<f64> {
        let col = self.years.iter().position(|&y| y == year)?;
        self.rows
            .iter()
            .find(|r| r.ticker == ticker && r.metric == metric)
            .and_then(|r| r.values[col])
    }
}
