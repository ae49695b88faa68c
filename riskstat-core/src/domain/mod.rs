//! Domain types for RiskStat

pub mod interval;
pub mod metric;
pub mod series;

pub use interval::{Interval, IntervalParseError};
pub use metric::{MetricName, MetricRecord};
pub use series::{PricePoint, PriceSeries, ReturnPoint, ReturnSeries};

/// Calendar year used as a partition key.
pub type YearKey = i32;
