//! RiskStat Runner: configuration, the per-year metrics pipeline, and reporting.
//!
//! This crate builds on `riskstat-core` to provide:
//! - TOML run configuration and price-source selection
//! - The metrics pipeline (benchmark once, tickers on a worker pool)
//! - Long-to-wide reshaping of metric records
//! - CSV / JSON / Markdown export and the console summary

pub mod config;
pub mod export;
pub mod pipeline;
pub mod reshape;
pub mod source;

pub use config::{ConfigError, ConfigFile, RunConfig};
pub use export::{
    export_json, export_pivot_csv, export_records_csv, generate_report, import_json, load_report,
    save_report, summary_text,
};
pub use pipeline::{
    run_pipeline, year_metrics, MetricsPipeline, PipelineError, PipelineResult, TickerFailure,
    YearError, YearMetrics,
};
pub use reshape::{PivotRow, PivotTable};
pub use source::{build_provider, PriceSource, SourceConfig};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn pipeline_result_is_send_sync() {
        assert_send::<PipelineResult>();
        assert_sync::<PipelineResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<SourceConfig>();
        assert_sync::<SourceConfig>();
    }

    #[test]
    fn pipeline_is_sync() {
        assert_sync::<MetricsPipeline<'static>>();
    }

    #[test]
    fn pivot_table_is_send_sync() {
        assert_send::<PivotTable>();
        assert_sync::<PivotTable>();
    }
}
