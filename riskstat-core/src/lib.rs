//! RiskStat Core: price series, providers, and the per-year risk estimators.
//!
//! This crate contains everything below the pipeline:
//! - Domain types (price and return series, intervals, metric records)
//! - Price-series providers (Yahoo Finance, CSV directory, synthetic)
//! - Series transforms (alignment, returns, calendar-year partitioning)
//! - Estimators (market beta, per-period Sharpe ratio)

pub mod data;
pub mod domain;
pub mod stats;

pub use domain::{Interval, MetricName, MetricRecord, PricePoint, PriceSeries, ReturnSeries, YearKey};
