//! Session bars and indicator rows.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Aggregated OHLCV over one half-open session window `[session_start, session_end)`.
///
/// `timestamp` is the timestamp of the last contributing minute bar, not
/// `session_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub session_start: NaiveDateTime,
    pub session_end: NaiveDateTime,
}

impl SessionBar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A session bar with its merged indicator columns.
///
/// Undefined values (warm-up) are stored as `f64::NAN` and surface as `None`
/// through [`IndicatorRow::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: SessionBar,
    pub values: BTreeMap<String, f64>,
}

impl IndicatorRow {
    pub fn new(bar: SessionBar) -> Self {
        Self {
            bar,
            values: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date()
    }

    /// Defined value of a named indicator, `None` if missing or NaN.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().filter(|v| !v.is_nan())
    }

    /// True when every named indicator has a defined value on this row.
    pub fn has_all(&self, names: &[String]) -> bool {
        names.iter().all(|n| self.value(n).is_some())
    }
}
