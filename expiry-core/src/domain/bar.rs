//! Minute bar as read from disk.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One-minute OHLCV bar for a single instrument.
///
/// Timestamps are exchange-local wall-clock times; the calendar date of a bar
/// is `timestamp.date()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Local calendar date of the bar.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Any OHLC field NaN. Such rows carry no usable price.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|v| v.is_nan())
    }
}
