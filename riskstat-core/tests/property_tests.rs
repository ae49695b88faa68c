//! Property tests for the series transforms and estimators.
//!
//! Uses proptest to verify:
//! 1. Alignment: both sides end on one shared date set; disjoint input aligns to nothing
//! 2. Returns: one fewer entry than prices, never negative length
//! 3. Beta: a series against itself is 1, a scaled copy recovers the scale
//! 4. Sharpe: unchanged by an equal shift of returns and rate, or by positive scaling
//! 5. Degenerate input: fewer than two points is undefined, never a panic
//! 6. Partitioning: year groups concatenate back to the input
//! 7. Undefined entries: dropped before estimating, same as never present

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use riskstat_core::domain::ReturnPoint;
use riskstat_core::stats::{align, beta, partition_by_year, returns, sharpe};
use riskstat_core::{PriceSeries, ReturnSeries};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 11, 20).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// Strictly ascending dates with gaps of 1..=9 days, starting at `start`.
fn arb_series_from(start: NaiveDate, max_len: usize) -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec((1..10i64, arb_price()), 0..max_len).prop_map(move |steps| {
        let mut date = start;
        PriceSeries::from_pairs(steps.into_iter().map(|(gap, price)| {
            date += Duration::days(gap);
            (date, price)
        }))
    })
}

fn arb_series(max_len: usize) -> impl Strategy<Value = PriceSeries> {
    arb_series_from(base_date(), max_len)
}

fn arb_returns(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.08..0.08_f64, min_len..120)
}

fn spread(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    max - min
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

// ── 1. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn aligned_sides_share_dates(a in arb_series(80), b in arb_series(80)) {
        let (x, y) = align(&a, &b);

        let xd: Vec<NaiveDate> = x.dates().collect();
        let yd: Vec<NaiveDate> = y.dates().collect();
        prop_assert_eq!(&xd, &yd);
        for date in &xd {
            prop_assert!(a.get(*date).is_some());
            prop_assert!(b.get(*date).is_some());
        }
        // Values are carried through untouched.
        for p in x.points() {
            prop_assert_eq!(Some(p.value), a.get(p.date));
        }
    }

    #[test]
    fn disjoint_ranges_align_to_nothing(a in arb_series(40), b in arb_series(40)) {
        // Shift `b` past the end of `a`.
        let offset = Duration::days(1000);
        let b = PriceSeries::from_pairs(b.points().iter().map(|p| (p.date + offset, p.value)));

        let (x, y) = align(&a, &b);
        prop_assert!(x.is_empty());
        prop_assert!(y.is_empty());
    }
}

// ── 2. Returns ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn returns_have_one_fewer_entry(s in arb_series(60)) {
        let r = returns(&s);
        prop_assert_eq!(r.len(), s.len().saturating_sub(1));
        // Positive prices: every return is defined and greater than -1.
        for v in r.defined_values() {
            prop_assert!(v > -1.0);
        }
        prop_assert_eq!(r.defined_values().count(), r.len());
    }
}

// ── 3. Beta ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn beta_against_itself_is_one(values in arb_returns(3)) {
        prop_assume!(spread(&values) > 1e-6);
        let r = ReturnSeries::from_values(&values);
        let b = beta(&r, &r).unwrap();
        prop_assert!(close(b, 1.0, 1e-9), "beta = {}", b);
    }

    #[test]
    fn beta_recovers_scale(values in arb_returns(3), k in 0.1..4.0_f64) {
        prop_assume!(spread(&values) > 1e-6);
        let market = ReturnSeries::from_values(&values);
        let scaled: Vec<f64> = values.iter().map(|v| v * k).collect();
        let stock = ReturnSeries::from_values(&scaled);
        let b = beta(&stock, &market).unwrap();
        prop_assert!(close(b, k, 1e-8), "beta = {} k = {}", b, k);
    }
}

// ── 4. Sharpe ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sharpe_ignores_equal_shift_of_returns_and_rate(
        values in arb_returns(3),
        shift in -0.01..0.01_f64,
        rf in 0.0..0.001_f64,
    ) {
        prop_assume!(spread(&values) > 1e-4);
        let base = sharpe(&ReturnSeries::from_values(&values), rf).unwrap();
        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
        let s = sharpe(&ReturnSeries::from_values(&shifted), rf + shift).unwrap();
        prop_assert!(close(s, base, 1e-8), "{} vs {}", s, base);
    }

    #[test]
    fn sharpe_is_scale_invariant(values in arb_returns(3), k in 0.5..3.0_f64) {
        prop_assume!(spread(&values) > 1e-4);
        let base = sharpe(&ReturnSeries::from_values(&values), 0.0).unwrap();
        let scaled: Vec<f64> = values.iter().map(|v| v * k).collect();
        let s = sharpe(&ReturnSeries::from_values(&scaled), 0.0).unwrap();
        prop_assert!(close(s, base, 1e-9), "{} vs {}", s, base);
    }

    #[test]
    fn constant_excess_has_no_sharpe(v in -0.05..0.05_f64, n in 2usize..50, rf in 0.0..0.001_f64) {
        let r = ReturnSeries::from_values(&vec![v; n]);
        prop_assert_eq!(sharpe(&r, rf), None);
    }
}

// ── 5. Degenerate input ──────────────────────────────────────────────

proptest! {
    #[test]
    fn fewer_than_two_points_is_undefined(values in prop::collection::vec(-0.1..0.1_f64, 0..2)) {
        let r = ReturnSeries::from_values(&values);
        prop_assert_eq!(beta(&r, &r), None);
        prop_assert_eq!(sharpe(&r, 0.0), None);
    }
}

// ── 6. Partitioning ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn partitions_concatenate_to_input(s in arb_series(200)) {
        let parts = partition_by_year(&s);

        let mut rebuilt = Vec::with_capacity(s.len());
        for (year, part) in &parts {
            prop_assert!(!part.is_empty());
            prop_assert!(part.dates().all(|d| d.year() == *year));
            rebuilt.extend_from_slice(part.points());
        }
        prop_assert_eq!(rebuilt.as_slice(), s.points());
    }
}

// ── 7. Undefined entries ─────────────────────────────────────────────

fn with_gaps(values: &[Option<f64>]) -> ReturnSeries {
    ReturnSeries::from_points(
        values
            .iter()
            .zip(base_date().iter_days())
            .map(|(&value, date)| ReturnPoint { date, value })
            .collect(),
    )
}

proptest! {
    #[test]
    fn undefined_returns_drop_out_of_both_estimators(
        pairs in prop::collection::vec(
            (prop::option::weighted(0.8, -0.08..0.08_f64), -0.08..0.08_f64),
            0..80,
        ),
        rf in 0.0..0.001_f64,
    ) {
        let stock: Vec<Option<f64>> = pairs.iter().map(|p| p.0).collect();
        let market: Vec<Option<f64>> = pairs.iter().map(|p| Some(p.1)).collect();
        let (kept_stock, kept_market): (Vec<f64>, Vec<f64>) =
            pairs.iter().filter_map(|&(s, m)| s.map(|s| (s, m))).unzip();

        let sparse_beta = beta(&with_gaps(&stock), &with_gaps(&market));
        let dense_beta = beta(
            &ReturnSeries::from_values(&kept_stock),
            &ReturnSeries::from_values(&kept_market),
        );
        prop_assert_eq!(sparse_beta, dense_beta);

        let sparse_sharpe = sharpe(&with_gaps(&stock), rf);
        let dense_sharpe = sharpe(&ReturnSeries::from_values(&kept_stock), rf);
        prop_assert_eq!(sparse_sharpe, dense_sharpe);
    }
}
