//! Expiry-cycle signal engine.
//!
//! Stages run strictly downstream, each producing a fresh collection:
//! resample → precompute → cycles → signal_scan → outcome → summary.

pub mod cycles;
pub mod outcome;
pub mod pipeline;
pub mod precompute;
pub mod resample;
pub mod signal_scan;
pub mod summary;

pub use cycles::{partition, CycleRows};
pub use outcome::{evaluate, expiry_closes};
pub use pipeline::{run_instrument, EngineError, InstrumentOutcome, StrategyParams};
pub use precompute::{apply_indicators, IndicatorError};
pub use resample::{resample, ResampleError, SessionSpec};
pub use signal_scan::{generate, generate_all, scan_cycle, CycleState};
pub use summary::{summarize, win_rate, PerformanceSummary};
