//! Cycle-scoped signal generator.
//!
//! Scans one cycle's rows in time order and emits at most one BULL and one
//! BEAR signal. State is a fresh [`CycleState`] per cycle; once both classes
//! are taken the rest of the cycle is skipped.

use chrono::NaiveDate;

use crate::components::check::{all_pass, SignalCheck, SignalChecks};
use crate::domain::{IndicatorRow, Signal, SignalType};

use super::cycles::CycleRows;

/// Per-cycle record of which signal classes have fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleState {
    pub bull_taken: bool,
    pub bear_taken: bool,
}

impl CycleState {
    pub fn is_exhausted(&self) -> bool {
        self.bull_taken && self.bear_taken
    }
}

/// Scan one cycle with fresh state.
pub fn generate(
    cycle_rows: &[IndicatorRow],
    expiry: NaiveDate,
    bull_checks: &[SignalCheck],
    bear_checks: &[SignalCheck],
) -> Vec<Signal> {
    let checks = SignalChecks {
        bull: bull_checks.to_vec(),
        bear: bear_checks.to_vec(),
    };
    let mut state = CycleState::default();
    scan_cycle(cycle_rows, expiry, &checks, &mut state)
}

/// Scan rows against `checks`, updating `state`.
///
/// Rows with any required column undefined are skipped. Both classes are
/// tried on the same row, bull first.
pub fn scan_cycle(
    rows: &[IndicatorRow],
    expiry: NaiveDate,
    checks: &SignalChecks,
    state: &mut CycleState,
) -> Vec<Signal> {
    let required = checks.required_columns();
    let mut signals = Vec::new();

    for row in rows {
        if state.is_exhausted() {
            break;
        }
        if !row.has_all(&required) {
            continue;
        }

        if !state.bull_taken && all_pass(&checks.bull, row) {
            signals.push(emit(row, expiry, SignalType::Bull));
            state.bull_taken = true;
        }
        if !state.bear_taken && all_pass(&checks.bear, row) {
            signals.push(emit(row, expiry, SignalType::Bear));
            state.bear_taken = true;
        }
    }

    signals
}

/// Scan every cycle in order, each with its own state.
pub fn generate_all(cycles: &[CycleRows<'_>], checks: &SignalChecks) -> Vec<Signal> {
    cycles
        .iter()
        .flat_map(|c| {
            let mut state = CycleState::default();
            scan_cycle(c.rows, c.cycle.end_date, checks, &mut state)
        })
        .collect()
}

fn emit(row: &IndicatorRow, expiry: NaiveDate, signal_type: SignalType) -> Signal {
    Signal {
        datetime: row.bar.timestamp,
        expiry,
        signal_type,
        reference_price: row.bar.close,
    }
}
