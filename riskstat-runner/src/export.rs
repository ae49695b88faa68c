//! Reporting and export: CSV, JSON, and Markdown artifacts.
//!
//! - **CSV**: the wide ticker x year table (`annual_metrics.csv`) and the
//!   long-form records (`records.csv`). Undefined values are empty cells.
//! - **JSON**: the full `PipelineResult`, undefined values as `null`.
//! - **Markdown**: a human-readable report with the pivot table.
//!
//! JSON carries a `schema_version`; newer versions are rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use riskstat_core::MetricRecord;

use crate::pipeline::{PipelineResult, SCHEMA_VERSION};
use crate::reshape::PivotTable;

pub const PIVOT_FILE: &str = "annual_metrics.csv";
pub const RECORDS_FILE: &str = "records.csv";
pub const RESULT_FILE: &str = "result.json";
pub const REPORT_FILE: &str = "report.md";

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &PipelineResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize PipelineResult to JSON")
}

/// Deserialize a `PipelineResult`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<PipelineResult> {
    let result: PipelineResult =
        serde_json::from_str(json).context("failed to deserialize PipelineResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Wide table: `Ticker,Metric,<year>,<year>,...`.
pub fn export_pivot_csv(table: &PivotTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Ticker".to_string(), "Metric".to_string()];
    header.extend(table.years.iter().map(|y| y.to_string()));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut fields = vec![row.ticker.clone(), row.metric.label().to_string()];
        fields.extend(row.values.iter().map(|v| cell(*v)));
        wtr.write_record(&fields)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Long form: `Ticker,Year,Metric,Value`.
pub fn export_records_csv(records: &[MetricRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Ticker", "Year", "Metric", "Value"])?;
    for r in records {
        wtr.write_record([
            r.ticker.clone(),
            r.year.to_string(),
            r.metric.label().to_string(),
            cell(r.value),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Console summary ────────────────────────────────────────────────

/// Plain-text summary of which tickers were processed.
pub fn summary_text(result: &PipelineResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary of Data Processing:");
    let _ = writeln!(
        out,
        "Successfully processed tickers ({}): {}",
        result.succeeded.len(),
        result.succeeded.join(", ")
    );
    let failed: Vec<&str> = result.failed_tickers().collect();
    let _ = writeln!(
        out,
        "Failed to process tickers ({}): {}",
        failed.len(),
        failed.join(", ")
    );
    for f in &result.failed {
        let _ = writeln!(out, "  {}: {}", f.ticker, f.reason);
    }
    out
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_report(result: &PipelineResult) -> String {
    let table = PivotTable::pivot(&result.records);
    let mut md = String::with_capacity(2048);

    md.push_str("# Annual Beta & Sharpe Ratio Report\n\n");

    md.push_str("## Run\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Benchmark | {} |", result.benchmark);
    let _ = writeln!(md, "| Interval | {} |", result.interval);
    let _ = writeln!(
        md,
        "| Risk-free rate | {:.2}% annual ({:.6} per period) |",
        result.risk_free_annual_rate * 100.0,
        result.risk_free_per_period
    );
    let _ = writeln!(md, "| Tickers succeeded | {} |", result.succeeded.len());
    let _ = writeln!(md, "| Tickers failed | {} |", result.failed.len());
    md.push('\n');

    md.push_str("## Metrics\n\n");
    if table.is_empty() {
        md.push_str("_No metrics computed._\n\n");
    } else {
        md.push_str("| Ticker | Metric |");
        for y in &table.years {
            let _ = write!(md, " {y} |");
        }
        md.push_str("\n| --- | --- |");
        md.push_str(&" --- |".repeat(table.years.len()));
        md.push('\n');
        for row in &table.rows {
            let _ = write!(md, "| {} | {} |", row.ticker, row.metric);
            for v in &row.values {
                match v {
                    Some(v) => {
                        let _ = write!(md, " {v:.3} |");
                    }
                    None => md.push_str(" — |"),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    }

    if !result.failed.is_empty() {
        md.push_str("## Failed Tickers\n\n");
        for f in &result.failed {
            let _ = writeln!(md, "- **{}**: {}", f.ticker, f.reason);
        }
        md.push('\n');
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the full artifact set into `output_dir` (created if missing):
/// `annual_metrics.csv`, `records.csv`, `result.json`, `report.md`.
///
/// Returns the directory written to.
pub fn save_report(result: &PipelineResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let table = PivotTable::pivot(&result.records);
    write_file(&output_dir.join(PIVOT_FILE), &export_pivot_csv(&table)?)?;
    write_file(&output_dir.join(RECORDS_FILE), &export_records_csv(&result.records)?)?;
    write_file(&output_dir.join(RESULT_FILE), &export_json(result)?)?;
    write_file(&output_dir.join(REPORT_FILE), &generate_report(result))?;

    Ok(output_dir.to_path_buf())
}

/// Load a `PipelineResult` from a directory written by [`save_report`].
pub fn load_report(dir: &Path) -> Result<PipelineResult> {
    let path = dir.join(RESULT_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
