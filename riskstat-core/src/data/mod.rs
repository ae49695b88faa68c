//! Price-series providers.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvDirProvider;
pub use provider::{
    DataSource, FetchError, FetchProgress, LogProgress, NoProgress, PriceSeriesProvider,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
