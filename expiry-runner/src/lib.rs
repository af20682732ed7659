//! Expiry Runner: data loading, configuration, batch orchestration, export.
//!
//! This crate builds on `expiry-core` to provide:
//! - TOML configuration with validation and fingerprinting
//! - Minute-bar CSV loading, instrument discovery, synthetic fallback
//! - Single-instrument runner with monthly expiry calendar
//! - Parallel batch runner with per-instrument failure isolation
//! - CSV / JSON artifact export and terminal reports

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use batch::{run_batch, BatchReport, InstrumentFailure, InstrumentSummary, SignalRecord};
pub use config::{parse_interval, BacktestConfig, ConfigError};
pub use data_loader::{
    discover_instruments, generate_synthetic_minute_bars, load_minute_bars, DataSource,
    InstrumentSource, LoadError,
};
pub use export::{
    export_signals_csv, export_summary_json, format_report, format_summary, save_artifacts,
};
pub use runner::{run_bars, run_single, InstrumentRun, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<InstrumentSource>();
        assert_sync::<InstrumentSource>();
    }

    #[test]
    fn run_results_are_send_sync() {
        assert_send::<InstrumentRun>();
        assert_sync::<InstrumentRun>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }

    #[test]
    fn batch_report_is_send_sync() {
        assert_send::<BatchReport>();
        assert_sync::<BatchReport>();
        assert_send::<InstrumentFailure>();
        assert_sync::<InstrumentFailure>();
    }
}
