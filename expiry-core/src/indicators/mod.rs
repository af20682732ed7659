//! Concrete indicator implementations.
//!
//! Both indicators implement the `Indicator` trait from `components::indicator`.
//! Bollinger emits its three bands as separate columns from a single instance.

pub mod bollinger;
pub mod rsi;

pub use bollinger::Bollinger;
pub use rsi::Rsi;

/// Column emitted by [`Rsi`].
pub const RSI: &str = "rsi";
/// Middle Bollinger band (simple moving average).
pub const SMA: &str = "sma";
/// Upper Bollinger band.
pub const UPPER_BB: &str = "upper_bb";
/// Lower Bollinger band.
pub const LOWER_BB: &str = "lower_bb";

/// Create synthetic indicator rows from close prices for testing.
///
/// One row per day at 15:29 covering the 09:15–15:30 session:
/// open = prev_close (or close for the first row), high/low = max/min ± 1.0.
#[cfg(test)]
pub fn make_rows(closes: &[f64]) -> Vec<crate::domain::IndicatorRow> {
    use crate::domain::{IndicatorRow, SessionBar};
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = base_date + chrono::Duration::days(i as i64);
            let open = if i == 0 { close } else { closes[i - 1] };
            IndicatorRow::new(SessionBar {
                timestamp: date.and_hms_opt(15, 29, 0).unwrap(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                session_start: date.and_hms_opt(9, 15, 0).unwrap(),
                session_end: date.and_hms_opt(15, 30, 0).unwrap(),
            })
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
