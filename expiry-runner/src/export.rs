//! Reporting and export: CSV signal tape, JSON summary, text report.
//!
//! The summary JSON carries a `schema_version`; unknown versions are
//! rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use expiry_core::domain::SignalType;
use expiry_core::engine::PerformanceSummary;

use crate::batch::{
    BatchReport, InstrumentFailure, InstrumentSummary, SignalRecord, SCHEMA_VERSION,
};

// ─── CSV export ─────────────────────────────────────────────────────

/// Export evaluated signals as CSV.
///
/// Columns: symbol, datetime, expiry, signal, reference_price, expiry_close,
/// success. Undefined values are empty cells.
pub fn export_signals_csv(rows: &[SignalRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "datetime",
        "expiry",
        "signal",
        "reference_price",
        "expiry_close",
        "success",
    ])?;

    for r in rows {
        let ev = &r.evaluated;
        wtr.write_record([
            r.symbol.clone(),
            ev.signal.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            ev.signal.expiry.to_string(),
            ev.signal.signal_type.to_string(),
            format!("{:.2}", ev.signal.reference_price),
            ev.expiry_close.map(|c| format!("{c:.2}")).unwrap_or_default(),
            ev.success.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Batch report without the per-signal list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub schema_version: u32,
    pub config_fingerprint: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strike_diff: u32,
    pub summary: PerformanceSummary,
    pub instruments: BTreeMap<String, InstrumentSummary>,
    pub failures: Vec<InstrumentFailure>,
    pub skipped: Vec<String>,
}

impl From<&BatchReport> for SummaryDocument {
    fn from(report: &BatchReport) -> Self {
        Self {
            schema_version: report.schema_version,
            config_fingerprint: report.config_fingerprint.clone(),
            start_date: report.start_date,
            end_date: report.end_date,
            strike_diff: report.strike_diff,
            summary: report.summary.clone(),
            instruments: report.instruments.clone(),
            failures: report.failures.clone(),
            skipped: report.skipped.clone(),
        }
    }
}

/// Serialize a batch summary (no signal list) to pretty JSON.
pub fn export_summary_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(&SummaryDocument::from(report))
        .context("failed to serialize batch summary to JSON")
}

/// Deserialize a batch summary, rejecting unknown schema versions.
pub fn import_summary_json(json: &str) -> Result<SummaryDocument> {
    let doc: SummaryDocument =
        serde_json::from_str(json).context("failed to deserialize batch summary from JSON")?;
    if doc.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            doc.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(doc)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a batch.
///
/// Creates `expiry_{timestamp}/` under `output_dir` containing:
/// - `summary.json`: overall and per-instrument summaries
/// - `signals.csv`: every evaluated signal
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &BatchReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("expiry_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_summary_json(report)?;
    std::fs::write(run_dir.join("summary.json"), &json)
        .with_context(|| format!("failed to write {}/summary.json", run_dir.display()))?;

    let csv = export_signals_csv(&report.signals)?;
    std::fs::write(run_dir.join("signals.csv"), &csv)
        .with_context(|| format!("failed to write {}/signals.csv", run_dir.display()))?;

    Ok(run_dir)
}

/// Load the summary from an artifact directory.
pub fn load_summary(dir: &Path) -> Result<SummaryDocument> {
    let path = dir.join("summary.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_summary_json(&json)
}

// ─── Text report ────────────────────────────────────────────────────

fn format_rates<K: std::fmt::Display>(rates: &BTreeMap<K, f64>) -> String {
    if rates.is_empty() {
        return "-".to_string();
    }
    rates
        .iter()
        .map(|(k, v)| format!("{k}: {v:.2}%"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a summary block for the terminal.
pub fn format_summary(summary: &PerformanceSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Signals: {} resolved ({} wins), {} unresolved\n",
        summary.total_signals, summary.total_wins, summary.unresolved_signals
    ));
    out.push_str(&format!("Overall win rate: {:.2}%\n", summary.overall_win_rate));
    out.push_str(&format!(
        "By signal type: {}\n",
        format_rates(&summary.win_rate_by_signal_type)
    ));
    out.push_str(&format!("By expiry year: {}\n", format_rates(&summary.win_rate_by_year)));
    out
}

/// Render the full batch report: overall summary, per-instrument table,
/// failures and skips.
pub fn format_report(report: &BatchReport) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str(&format!(
        "Backtest {} to {} ({} instruments)\n",
        report.start_date,
        report.end_date,
        report.instruments.len() + report.failures.len() + report.skipped.len()
    ));
    if report.has_synthetic() {
        out.push_str("Data: SYNTHETIC\n");
    }
    out.push('\n');
    out.push_str(&format_summary(&report.summary));

    if !report.instruments.is_empty() {
        out.push_str(&format!(
            "\n{:<12} {:>8} {:>8} {:>10} {:>10} {:>10}\n",
            "symbol", "signals", "wins", "win_rate", "bull", "bear"
        ));
        for (symbol, inst) in &report.instruments {
            let s = &inst.summary;
            let by_type = |t: SignalType| {
                s.win_rate_by_signal_type
                    .get(&t)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string())
            };
            out.push_str(&format!(
                "{:<12} {:>8} {:>8} {:>10.2} {:>10} {:>10}\n",
                symbol,
                s.total_signals,
                s.total_wins,
                s.overall_win_rate,
                by_type(SignalType::Bull),
                by_type(SignalType::Bear)
            ));
        }
    }

    for f in &report.failures {
        out.push_str(&format!("\nFAILED {}: {}", f.symbol, f.error));
    }
    if !report.skipped.is_empty() {
        out.push_str(&format!("\nSkipped (no data): {}", report.skipped.join(", ")));
    }
    out
}
