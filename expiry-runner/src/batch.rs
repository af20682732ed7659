//! Batch runner: every instrument through the pipeline, isolated.
//!
//! Each instrument runs as an independent task and yields a result-or-error.
//! A failing instrument is logged and recorded; its siblings are unaffected.
//! Output is ordered by symbol whatever the thread count.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use expiry_core::domain::EvaluatedSignal;
use expiry_core::engine::{summarize, PerformanceSummary};

use crate::config::BacktestConfig;
use crate::data_loader::InstrumentSource;
use crate::runner::{run_single, InstrumentRun, RunError};

/// Current schema version for persisted batch artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// An evaluated signal tagged with its instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    #[serde(flatten)]
    pub evaluated: EvaluatedSignal,
}

/// An instrument whose run failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFailure {
    pub symbol: String,
    pub error: String,
}

/// Per-instrument slice of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub synthetic: bool,
    pub minute_bars: usize,
    pub session_bars: usize,
    pub cycles: usize,
    pub signals: usize,
    pub summary: PerformanceSummary,
}

/// Everything one batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_fingerprint: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Carried from `[options]` for the record.
    pub strike_diff: u32,
    /// Summary over every instrument's evaluated signals.
    pub summary: PerformanceSummary,
    pub instruments: BTreeMap<String, InstrumentSummary>,
    pub failures: Vec<InstrumentFailure>,
    /// Instruments with no minute bars in range.
    pub skipped: Vec<String>,
    #[serde(default)]
    pub signals: Vec<SignalRecord>,
}

impl BatchReport {
    pub fn has_synthetic(&self) -> bool {
        self.instruments.values().any(|i| i.synthetic)
    }
}

/// Run every instrument and collect a report.
///
/// Only an invalid config fails the whole batch. `config.backtest.threads`
/// picks the parallelism: 1 runs sequentially, 0 uses the global rayon pool.
pub fn run_batch(
    instruments: &[InstrumentSource],
    config: &BacktestConfig,
) -> Result<BatchReport, RunError> {
    config.validate()?;
    let config_fingerprint = config.fingerprint()?;

    let run_one = |source: &InstrumentSource| {
        info!(symbol = %source.symbol, "backtest started");
        (source.symbol.clone(), run_single(source, config))
    };

    let mut results: Vec<(String, Result<InstrumentRun, RunError>)> =
        match config.backtest.threads {
            1 => instruments.iter().map(run_one).collect(),
            0 => instruments.par_iter().map(run_one).collect(),
            n => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()?
                .install(|| instruments.par_iter().map(run_one).collect()),
        };
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut instruments_out = BTreeMap::new();
    let mut signals = Vec::new();
    let mut failures = Vec::new();
    let mut skipped = Vec::new();

    for (symbol, result) in results {
        match result {
            Ok(run) => {
                info!(
                    symbol = %symbol,
                    signals = run.outcome.evaluated.len(),
                    win_rate = run.outcome.summary.overall_win_rate,
                    "backtest finished"
                );
                instruments_out.insert(
                    symbol.clone(),
                    InstrumentSummary {
                        synthetic: run.synthetic,
                        minute_bars: run.outcome.minute_bars,
                        session_bars: run.outcome.session_bars,
                        cycles: run.outcome.cycles,
                        signals: run.outcome.evaluated.len(),
                        summary: run.outcome.summary,
                    },
                );
                signals.extend(run.outcome.evaluated.into_iter().map(|evaluated| SignalRecord {
                    symbol: symbol.clone(),
                    evaluated,
                }));
            }
            Err(RunError::NoBars(_)) => {
                info!(symbol = %symbol, "no minute bars in range, skipped");
                skipped.push(symbol);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "instrument failed");
                failures.push(InstrumentFailure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }

    let all: Vec<EvaluatedSignal> = signals.iter().map(|r| r.evaluated.clone()).collect();
    let summary = summarize(&all);

    Ok(BatchReport {
        schema_version: SCHEMA_VERSION,
        config_fingerprint,
        start_date: config.backtest.start_date,
        end_date: config.backtest.end_date,
        strike_diff: config.options.strike_diff,
        summary,
        instruments: instruments_out,
        failures,
        skipped,
        signals,
    })
}
