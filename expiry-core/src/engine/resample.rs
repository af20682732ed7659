//! Session resampler: 1-minute bars into fixed-width session bars.
//!
//! Each trading day is cut into bins starting at market open and stepping by
//! the interval. The last bin is clipped so it always ends exactly at market
//! close, whether or not the interval divides the trading day. Empty bins are
//! skipped, never padded.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::domain::{Bar, SessionBar};

#[derive(Debug, Error, PartialEq)]
pub enum ResampleError {
    #[error("malformed input: bar {index} at {current} does not follow {previous}")]
    MalformedInput {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("invalid session: {0}")]
    InvalidSession(String),
}

/// Session bin layout for one trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSpec {
    interval: Duration,
    market_open: NaiveTime,
    market_close: NaiveTime,
}

impl SessionSpec {
    pub fn new(
        interval: Duration,
        market_open: NaiveTime,
        market_close: NaiveTime,
    ) -> Result<Self, ResampleError> {
        if interval <= Duration::zero() {
            return Err(ResampleError::InvalidSession(format!(
                "interval must be positive, got {interval}"
            )));
        }
        if market_open >= market_close {
            return Err(ResampleError::InvalidSession(format!(
                "market_open {market_open} must precede market_close {market_close}"
            )));
        }
        Ok(Self {
            interval,
            market_open,
            market_close,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn market_open(&self) -> NaiveTime {
        self.market_open
    }

    pub fn market_close(&self) -> NaiveTime {
        self.market_close
    }

    /// Bin edges for one date: open, open + k*interval while < close, then close.
    pub fn bin_edges(&self, date: NaiveDate) -> Vec<NaiveDateTime> {
        let start = date.and_time(self.market_open);
        let end = date.and_time(self.market_close);

        // Wider than the trading day is one bin; also keeps the sums in range
        let step = self.interval.min(end - start);
        let mut edges = vec![start];
        let mut t = start + step;
        while t < end {
            edges.push(t);
            t += step;
        }
        edges.push(end);
        edges
    }

    /// Upper bound on the number of session bars one day can produce.
    pub fn max_sessions_per_day(&self) -> usize {
        let day = (self.market_close - self.market_open).num_seconds();
        let step = self.interval.num_seconds().max(1);
        ((day + step - 1) / step) as usize
    }
}

impl Default for SessionSpec {
    /// One session per day, 09:15–15:30.
    fn default() -> Self {
        Self {
            interval: Duration::days(1),
            market_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            market_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Resample time-ordered 1-minute bars into session bars.
///
/// Fails fast with [`ResampleError::MalformedInput`] if timestamps are not
/// strictly increasing. Output is ascending by timestamp.
pub fn resample(bars: &[Bar], spec: &SessionSpec) -> Result<Vec<SessionBar>, ResampleError> {
    check_monotonic(bars)?;

    let mut sessions = Vec::new();
    let mut i = 0;
    while i < bars.len() {
        let date = bars[i].date();
        let mut j = i + 1;
        while j < bars.len() && bars[j].date() == date {
            j += 1;
        }
        resample_day(date, &bars[i..j], spec, &mut sessions);
        i = j;
    }

    Ok(sessions)
}

fn check_monotonic(bars: &[Bar]) -> Result<(), ResampleError> {
    for (offset, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ResampleError::MalformedInput {
                index: offset + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

fn resample_day(date: NaiveDate, day: &[Bar], spec: &SessionSpec, out: &mut Vec<SessionBar>) {
    let edges = spec.bin_edges(date);

    let mut k = 0;
    for bin in edges.windows(2) {
        let (lo, hi) = (bin[0], bin[1]);
        while k < day.len() && day[k].timestamp < lo {
            k += 1;
        }
        let start = k;
        while k < day.len() && day[k].timestamp < hi {
            k += 1;
        }
        if start == k {
            continue;
        }
        out.push(aggregate(&day[start..k], lo, hi));
    }
}

/// Aggregate a non-empty run of bars into one session bar.
fn aggregate(run: &[Bar], session_start: NaiveDateTime, session_end: NaiveDateTime) -> SessionBar {
    let first = &run[0];
    let last = &run[run.len() - 1];
    SessionBar {
        timestamp: last.timestamp,
        open: first.open,
        high: run.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        low: run.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        close: last.close,
        volume: run.iter().map(|b| b.volume).sum(),
        session_start,
        session_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32, h: u32, m: u32, close: f64) -> Bar {
        Bar {
            timestamp: day(d).and_time(t(h, m)),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    fn spec(interval: Duration) -> SessionSpec {
        SessionSpec::new(interval, t(9, 15), t(15, 30)).unwrap()
    }

    #[test]
    fn edges_clip_to_market_close() {
        // 09:15 + 2h steps: 11:15, 13:15, then 15:15 < 15:30, then forced close
        let edges = spec(Duration::hours(2)).bin_edges(day(2));
        let times: Vec<NaiveTime> = edges.iter().map(|e| e.time()).collect();
        assert_eq!(
            times,
            vec![t(9, 15), t(11, 15), t(13, 15), t(15, 15), t(15, 30)]
        );
    }

    #[test]
    fn edges_exact_division_has_no_duplicate_close() {
        // 6h15m trading day divides evenly into 75-minute bins
        let edges = spec(Duration::minutes(75)).bin_edges(day(2));
        assert_eq!(edges.len(), 6);
        assert_eq!(edges.last().unwrap().time(), t(15, 30));
        assert_ne!(edges[edges.len() - 2], edges[edges.len() - 1]);
    }

    #[test]
    fn daily_interval_is_one_bin() {
        let edges = spec(Duration::days(1)).bin_edges(day(2));
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn interval_beyond_date_range_is_one_bin() {
        let s = spec(Duration::days(100_000_000));
        let edges = s.bin_edges(day(2));
        assert_eq!(edges, vec![day(2).and_time(t(9, 15)), day(2).and_time(t(15, 30))]);
        assert_eq!(s.max_sessions_per_day(), 1);

        let sessions = resample(&[bar(2, 9, 30, 100.0), bar(2, 14, 0, 101.0)], &s).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].close, 101.0);
    }

    #[test]
    fn aggregates_ohlcv() {
        let bars = vec![
            bar(2, 9, 15, 100.0),
            bar(2, 9, 16, 103.0),
            bar(2, 9, 17, 98.0),
        ];
        let sessions = resample(&bars, &spec(Duration::days(1))).unwrap();
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.open, 99.5);
        assert_eq!(s.high, 104.0);
        assert_eq!(s.low, 97.0);
        assert_eq!(s.close, 98.0);
        assert_eq!(s.volume, 30.0);
        assert_eq!(s.timestamp, day(2).and_time(t(9, 17)));
        assert_eq!(s.session_start, day(2).and_time(t(9, 15)));
        assert_eq!(s.session_end, day(2).and_time(t(15, 30)));
    }

    #[test]
    fn bars_outside_market_hours_are_dropped() {
        let bars = vec![
            bar(2, 9, 0, 1.0),
            bar(2, 9, 15, 2.0),
            bar(2, 15, 29, 3.0),
            bar(2, 15, 30, 4.0), // close instant belongs to no bin
        ];
        let sessions = resample(&bars, &spec(Duration::days(1))).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].open, 1.5);
        assert_eq!(sessions[0].close, 3.0);
    }

    #[test]
    fn day_entirely_outside_hours_contributes_nothing() {
        let bars = vec![bar(2, 8, 0, 1.0), bar(2, 16, 0, 2.0), bar(3, 10, 0, 3.0)];
        let sessions = resample(&bars, &spec(Duration::days(1))).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].date(), day(3));
    }

    #[test]
    fn empty_bins_are_skipped() {
        // 1h bins, bars only in first and last bins
        let bars = vec![bar(2, 9, 20, 1.0), bar(2, 15, 20, 2.0)];
        let sessions = resample(&bars, &spec(Duration::hours(1))).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].session_start, day(2).and_time(t(15, 15)));
        assert_eq!(sessions[1].session_end, day(2).and_time(t(15, 30)));
    }

    #[test]
    fn output_sorted_across_days() {
        let bars = vec![bar(2, 10, 0, 1.0), bar(3, 10, 0, 2.0), bar(4, 10, 0, 3.0)];
        let sessions = resample(&bars, &spec(Duration::hours(4))).unwrap();
        assert_eq!(sessions.len(), 3);
        assert!(sessions.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn non_monotonic_input_fails_fast() {
        let bars = vec![bar(2, 10, 0, 1.0), bar(2, 9, 59, 2.0)];
        let err = resample(&bars, &spec(Duration::hours(1))).unwrap_err();
        assert!(matches!(err, ResampleError::MalformedInput { index: 1, .. }));
    }

    #[test]
    fn duplicate_timestamp_fails_fast() {
        let bars = vec![bar(2, 10, 0, 1.0), bar(2, 10, 0, 2.0)];
        assert!(resample(&bars, &spec(Duration::hours(1))).is_err());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(resample(&[], &SessionSpec::default()).unwrap().is_empty());
    }

    #[test]
    fn invalid_session_rejected() {
        assert!(SessionSpec::new(Duration::zero(), t(9, 15), t(15, 30)).is_err());
        assert!(SessionSpec::new(Duration::hours(1), t(15, 30), t(9, 15)).is_err());
    }

    #[test]
    fn max_sessions_rounds_up() {
        assert_eq!(spec(Duration::hours(2)).max_sessions_per_day(), 4);
        assert_eq!(spec(Duration::minutes(75)).max_sessions_per_day(), 5);
        assert_eq!(spec(Duration::days(1)).max_sessions_per_day(), 1);
    }
}
