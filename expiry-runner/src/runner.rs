//! Instrument runner: wires together loading, the expiry calendar, and the
//! core engine.
//!
//! Two entry points:
//! - `run_single()`: loads one instrument's bars, then runs. Used by the batch.
//! - `run_bars()`: takes pre-loaded bars. Used by `expiry single` and tests.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use expiry_core::calendar::monthly_expiries;
use expiry_core::domain::Bar;
use expiry_core::engine::{run_instrument, EngineError, InstrumentOutcome, StrategyParams};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{InstrumentSource, LoadError};

/// Errors from one instrument run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("no minute bars for '{0}' in the requested range")]
    NoBars(String),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of running one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentRun {
    pub symbol: String,
    /// True when bars came from the synthetic generator.
    pub synthetic: bool,
    pub expiries: Vec<NaiveDate>,
    pub outcome: InstrumentOutcome,
}

/// Load one instrument's bars and run it.
///
/// Returns [`RunError::NoBars`] when the source has no bars in the configured
/// date range.
pub fn run_single(
    source: &InstrumentSource,
    config: &BacktestConfig,
) -> Result<InstrumentRun, RunError> {
    let params = config.to_strategy_params()?;
    let start = config.backtest.start_date;
    let end = config.backtest.end_date;
    let bars = source.load(
        start,
        end,
        params.session.market_open(),
        params.session.market_close(),
    )?;
    run_bars(&source.symbol, &bars, start, end, source.is_synthetic(), &params)
}

/// Run pre-loaded bars: no I/O.
///
/// Expiries are the monthly expiries over `[start, end]`, rolled back to the
/// instrument's own trading days.
pub fn run_bars(
    symbol: &str,
    bars: &[Bar],
    start: NaiveDate,
    end: NaiveDate,
    synthetic: bool,
    params: &StrategyParams,
) -> Result<InstrumentRun, RunError> {
    if bars.is_empty() {
        return Err(RunError::NoBars(symbol.to_string()));
    }
    let trading_days: BTreeSet<NaiveDate> = bars.iter().map(Bar::date).collect();
    let expiries = monthly_expiries(start, end, &trading_days);
    let outcome = run_instrument(bars, &expiries, params)?;

    Ok(InstrumentRun {
        symbol: symbol.to_string(),
        synthetic,
        expiries,
        outcome,
    })
}
