//! Single-instrument pipeline: resample → indicators → cycles → signals →
//! outcomes → summary.
//!
//! Synchronous and self-contained. Shares no state between calls, so
//! instruments can run on separate threads without coordination.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::components::check::SignalChecks;
use crate::components::indicator::Indicator;
use crate::domain::{Bar, EvaluatedSignal, Signal};
use crate::indicators::{Bollinger, Rsi};

use super::cycles::partition;
use super::outcome::{evaluate, expiry_closes};
use super::precompute::{apply_indicators, IndicatorError};
use super::resample::{resample, ResampleError, SessionSpec};
use super::signal_scan::generate_all;
use super::summary::{summarize, PerformanceSummary};

/// Errors from one instrument run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resample error: {0}")]
    Resample(#[from] ResampleError),
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Everything the engine needs besides bars and expiries.
#[derive(Debug, Clone)]
pub struct StrategyParams {
    pub session: SessionSpec,
    pub rsi_window: usize,
    pub bb_window: usize,
    pub bb_dev: f64,
    pub checks: SignalChecks,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            session: SessionSpec::default(),
            rsi_window: 14,
            bb_window: 20,
            bb_dev: 2.0,
            checks: SignalChecks::default(),
        }
    }
}

impl StrategyParams {
    /// Indicator set in application order: RSI, then Bollinger.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Rsi::new(self.rsi_window)),
            Box::new(Bollinger::new(self.bb_window, self.bb_dev)),
        ]
    }
}

/// Result of one instrument run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentOutcome {
    pub signals: Vec<Signal>,
    pub evaluated: Vec<EvaluatedSignal>,
    pub summary: PerformanceSummary,
    pub minute_bars: usize,
    pub session_bars: usize,
    pub cycles: usize,
}

/// Run the full pipeline for one instrument.
///
/// `bars` must be time-ordered 1-minute bars; `expiries` ascending and
/// duplicate-free.
pub fn run_instrument(
    bars: &[Bar],
    expiries: &[NaiveDate],
    params: &StrategyParams,
) -> Result<InstrumentOutcome, EngineError> {
    let sessions = resample(bars, &params.session)?;
    let rows = apply_indicators(&sessions, &params.indicators())?;
    let cycles = partition(&rows, expiries);
    let signals = generate_all(&cycles, &params.checks);

    let closes = expiry_closes(bars, expiries);
    let evaluated = evaluate(&signals, &closes);
    let summary = summarize(&evaluated);

    debug!(
        minute_bars = bars.len(),
        session_bars = sessions.len(),
        cycles = cycles.len(),
        signals = signals.len(),
        resolved_expiries = closes.len(),
        "instrument pipeline complete"
    );

    Ok(InstrumentOutcome {
        minute_bars: bars.len(),
        session_bars: sessions.len(),
        cycles: cycles.len(),
        signals,
        evaluated,
        summary,
    })
}
