//! Performance aggregator: win rates from evaluated signals.
//!
//! Only signals with a defined outcome count. Rates are percentages rounded to
//! two decimals; an empty denominator gives 0.0.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::{EvaluatedSignal, SignalType};

/// Aggregate win statistics. Derived on demand, never persisted as state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Signals with a defined outcome.
    pub total_signals: usize,
    pub total_wins: usize,
    pub overall_win_rate: f64,
    pub win_rate_by_signal_type: BTreeMap<SignalType, f64>,
    /// Keyed by the year of the signal's expiry.
    pub win_rate_by_year: BTreeMap<i32, f64>,
    /// Signals dropped from every rate because their expiry had no close.
    pub unresolved_signals: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: usize,
    wins: usize,
}

impl Tally {
    fn record(&mut self, win: bool) {
        self.total += 1;
        if win {
            self.wins += 1;
        }
    }

    fn rate(&self) -> f64 {
        win_rate(self.wins, self.total)
    }
}

/// wins / total * 100 rounded to 2 decimals; 0.0 when total is 0.
pub fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(wins as f64 / total as f64 * 100.0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Summarize evaluated signals.
pub fn summarize(evaluated: &[EvaluatedSignal]) -> PerformanceSummary {
    let mut overall = Tally::default();
    let mut by_type: BTreeMap<SignalType, Tally> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, Tally> = BTreeMap::new();
    let mut unresolved = 0;

    for ev in evaluated {
        let Some(win) = ev.success else {
            unresolved += 1;
            continue;
        };
        overall.record(win);
        by_type.entry(ev.signal.signal_type).or_default().record(win);
        by_year.entry(ev.signal.expiry.year()).or_default().record(win);
    }

    PerformanceSummary {
        total_signals: overall.total,
        total_wins: overall.wins,
        overall_win_rate: overall.rate(),
        win_rate_by_signal_type: by_type.into_iter().map(|(k, t)| (k, t.rate())).collect(),
        win_rate_by_year: by_year.into_iter().map(|(k, t)| (k, t.rate())).collect(),
        unresolved_signals: unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use chrono::NaiveDate;

    fn ev(signal_type: SignalType, year: i32, success: Option<bool>) -> EvaluatedSignal {
        let expiry = NaiveDate::from_ymd_opt(year, 1, 25).unwrap();
        EvaluatedSignal {
            signal: Signal {
                datetime: expiry.and_hms_opt(9, 15, 0).unwrap(),
                expiry,
                signal_type,
                reference_price: 100.0,
            },
            expiry_close: success.map(|_| 100.0),
            success,
        }
    }

    #[test]
    fn empty_input_zero_rate() {
        let s = summarize(&[]);
        assert_eq!(s.total_signals, 0);
        assert_eq!(s.overall_win_rate, 0.0);
        assert!(s.win_rate_by_signal_type.is_empty());
        assert!(s.win_rate_by_year.is_empty());
    }

    #[test]
    fn rates_rounded_to_two_decimals() {
        let evaluated = vec![
            ev(SignalType::Bull, 2023, Some(true)),
            ev(SignalType::Bull, 2023, Some(false)),
            ev(SignalType::Bull, 2023, Some(false)),
        ];
        let s = summarize(&evaluated);
        assert_eq!(s.total_signals, 3);
        assert_eq!(s.total_wins, 1);
        assert_eq!(s.overall_win_rate, 33.33);
    }

    #[test]
    fn groups_by_type_and_expiry_year() {
        let evaluated = vec![
            ev(SignalType::Bull, 2022, Some(true)),
            ev(SignalType::Bear, 2022, Some(false)),
            ev(SignalType::Bear, 2023, Some(true)),
            ev(SignalType::Bear, 2023, Some(true)),
        ];
        let s = summarize(&evaluated);
        assert_eq!(s.overall_win_rate, 75.0);
        assert_eq!(s.win_rate_by_signal_type[&SignalType::Bull], 100.0);
        assert_eq!(s.win_rate_by_signal_type[&SignalType::Bear], 66.67);
        assert_eq!(s.win_rate_by_year[&2022], 50.0);
        assert_eq!(s.win_rate_by_year[&2023], 100.0);
    }

    #[test]
    fn unresolved_excluded_from_denominators() {
        let evaluated = vec![
            ev(SignalType::Bull, 2023, Some(true)),
            ev(SignalType::Bear, 2024, None),
        ];
        let s = summarize(&evaluated);
        assert_eq!(s.total_signals, 1);
        assert_eq!(s.overall_win_rate, 100.0);
        assert_eq!(s.unresolved_signals, 1);
        assert!(!s.win_rate_by_signal_type.contains_key(&SignalType::Bear));
        assert!(!s.win_rate_by_year.contains_key(&2024));
    }

    #[test]
    fn summary_serializes_type_keys() {
        let s = summarize(&[ev(SignalType::Bull, 2023, Some(true))]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["win_rate_by_signal_type"]["BULL"], 100.0);
        assert_eq!(json["win_rate_by_year"]["2023"], 100.0);
    }
}
