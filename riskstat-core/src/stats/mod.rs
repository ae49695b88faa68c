//! Series transforms and estimators.
//!
//! Every function here is pure: series in, series or scalar out. Degenerate
//! input produces `None` or an empty series, never an error.

pub mod align;
pub mod beta;
pub mod partition;
pub mod returns;
pub mod sharpe;

pub use align::align;
pub use beta::beta;
pub use partition::{partition_by_year, PartitionedSeries};
pub use returns::returns;
pub use sharpe::{per_period_risk_free, sharpe, TRADING_PERIODS_PER_YEAR};

/// Arithmetic mean. Caller guarantees a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// True when every value is bit-for-bit equal to the first.
///
/// A constant sample has zero spread exactly; summing it and dividing by `n`
/// can land one ulp off the value, which would leave a spurious non-zero
/// variance behind.
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}
