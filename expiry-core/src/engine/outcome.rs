//! Outcome evaluator: score each signal against the close on its expiry date.
//!
//! BULL succeeds iff expiry_close > reference_price; BEAR iff
//! expiry_close < reference_price. Equality fails both. A signal whose expiry
//! has no close is kept with an undefined outcome.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Bar, EvaluatedSignal, Signal, SignalType};

/// Close of the last bar on each expiry date. Expiries with no bars that day
/// are absent from the map.
pub fn expiry_closes(bars: &[Bar], expiries: &[NaiveDate]) -> BTreeMap<NaiveDate, f64> {
    let mut last_close: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for bar in bars {
        // Bars are time-ordered, so the last write per date wins
        last_close.insert(bar.date(), bar.close);
    }

    expiries
        .iter()
        .filter_map(|exp| last_close.get(exp).map(|&close| (*exp, close)))
        .collect()
}

/// Join signals to their expiry closes and label each success or failure.
pub fn evaluate(
    signals: &[Signal],
    expiry_closes: &BTreeMap<NaiveDate, f64>,
) -> Vec<EvaluatedSignal> {
    signals
        .iter()
        .map(|signal| {
            let expiry_close = expiry_closes.get(&signal.expiry).copied();
            let success = expiry_close.map(|close| is_success(signal, close));
            EvaluatedSignal {
                signal: signal.clone(),
                expiry_close,
                success,
            }
        })
        .collect()
}

fn is_success(signal: &Signal, expiry_close: f64) -> bool {
    match signal.signal_type {
        SignalType::Bull => expiry_close > signal.reference_price,
        SignalType::Bear => expiry_close < signal.reference_price,
    }
}
