//! Signal checks: the predicates a row must pass to emit a signal.
//!
//! A check list is a short-circuiting conjunction: every check must pass, and
//! evaluation stops at the first failure. Checks are small tagged variants so
//! they can be written in a config file.

use serde::{Deserialize, Serialize};

use crate::domain::IndicatorRow;
use crate::indicators::{LOWER_BB, RSI, UPPER_BB};

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalCheck {
    /// close < lower Bollinger band.
    CloseBelowLowerBand,
    /// close > upper Bollinger band.
    CloseAboveUpperBand,
    /// rsi < threshold.
    RsiOversold {
        #[serde(default = "default_oversold")]
        threshold: f64,
    },
    /// rsi > threshold.
    RsiOverbought {
        #[serde(default = "default_overbought")]
        threshold: f64,
    },
}

impl SignalCheck {
    /// Indicator column this check reads.
    pub fn column(&self) -> &'static str {
        match self {
            SignalCheck::CloseBelowLowerBand => LOWER_BB,
            SignalCheck::CloseAboveUpperBand => UPPER_BB,
            SignalCheck::RsiOversold { .. } | SignalCheck::RsiOverbought { .. } => RSI,
        }
    }

    /// Evaluate against a row. An undefined column never passes.
    pub fn passes(&self, row: &IndicatorRow) -> bool {
        let Some(value) = row.value(self.column()) else {
            return false;
        };
        let close = row.bar.close;
        match self {
            SignalCheck::CloseBelowLowerBand => close < value,
            SignalCheck::CloseAboveUpperBand => close > value,
            SignalCheck::RsiOversold { threshold } => value < *threshold,
            SignalCheck::RsiOverbought { threshold } => value > *threshold,
        }
    }
}

/// True when every check passes. Stops at the first failing check.
pub fn all_pass(checks: &[SignalCheck], row: &IndicatorRow) -> bool {
    for check in checks {
        if !check.passes(row) {
            return false;
        }
    }
    true
}

/// The ordered bull and bear check lists used by the cycle scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalChecks {
    pub bull: Vec<SignalCheck>,
    pub bear: Vec<SignalCheck>,
}

impl Default for SignalChecks {
    fn default() -> Self {
        Self {
            bull: vec![SignalCheck::CloseBelowLowerBand],
            bear: vec![SignalCheck::CloseAboveUpperBand],
        }
    }
}

impl SignalChecks {
    /// Columns read by either list, deduplicated, in first-use order.
    pub fn required_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = Vec::new();
        for check in self.bull.iter().chain(self.bear.iter()) {
            let name = check.column();
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        }
        cols
    }
}
