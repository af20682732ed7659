//! Signals, their evaluated outcomes, and expiry cycles.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction class of a mean-reversion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    /// Oversold: expects price to finish above the reference.
    Bull,
    /// Overbought: expects price to finish below the reference.
    Bear,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Bull => f.pad("BULL"),
            SignalType::Bear => f.pad("BEAR"),
        }
    }
}

/// Date window of one expiry cycle, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryCycle {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ExpiryCycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A directional entry emitted by the cycle scan. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub datetime: NaiveDateTime,
    pub expiry: NaiveDate,
    pub signal_type: SignalType,
    pub reference_price: f64,
}

/// A signal joined with the realized close on its expiry date.
///
/// Both `expiry_close` and `success` are `None` when the expiry date has no
/// trading data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedSignal {
    #[serde(flatten)]
    pub signal: Signal,
    pub expiry_close: Option<f64>,
    pub success: Option<bool>,
}
