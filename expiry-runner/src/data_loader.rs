//! Minute-bar loading for the runner.
//!
//! Instruments come from a folder of `<NAME>_minute.csv` files, or from a
//! deterministic synthetic generator. Synthetic data is a developer-only
//! mode; results produced on it are tagged.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use expiry_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} line {line}: invalid timestamp '{value}'")]
    BadTimestamp {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("no CSV files in {0}")]
    EmptyDirectory(PathBuf),
}

/// Where an instrument's bars come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic,
}

/// A named instrument and its data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSource {
    pub symbol: String,
    pub source: DataSource,
}

impl InstrumentSource {
    pub fn csv(symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            source: DataSource::Csv(path.into()),
        }
    }

    pub fn synthetic(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            source: DataSource::Synthetic,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }

    /// Load bars in `[start, end]`. Synthetic bars cover market hours only.
    pub fn load(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        market_open: NaiveTime,
        market_close: NaiveTime,
    ) -> Result<Vec<Bar>, LoadError> {
        match &self.source {
            DataSource::Csv(path) => load_minute_bars(path, start, end),
            DataSource::Synthetic => Ok(generate_synthetic_minute_bars(
                &self.symbol,
                start,
                end,
                market_open,
                market_close,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parse a bar timestamp. Accepts a space or `T` separator, optional
/// seconds, and an optional UTC offset (dropped; wall-clock time is kept).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Load 1-minute bars from a CSV with header `date,open,high,low,close,volume`.
///
/// Rows with a NaN price are dropped. Bars are sorted by timestamp, duplicate
/// timestamps keep the first row, and only days in `[start, end]` are kept.
pub fn load_minute_bars(
    path: &Path,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut bars = Vec::new();
    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(csv_err)?;
        let Some(timestamp) = parse_timestamp(&row.date) else {
            return Err(LoadError::BadTimestamp {
                path: path.to_path_buf(),
                // Header is line 1
                line: i as u64 + 2,
                value: row.date,
            });
        };
        let date = timestamp.date();
        if date < start || date > end {
            continue;
        }
        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    let read = bars.len();
    bars.retain(|b| !b.is_void());
    if bars.len() < read {
        debug!(
            path = %path.display(),
            dropped = read - bars.len(),
            "dropped rows with missing prices"
        );
    }

    bars.sort_by_key(|b| b.timestamp);
    let before = bars.len();
    bars.dedup_by_key(|b| b.timestamp);
    if bars.len() < before {
        debug!(
            path = %path.display(),
            dropped = before - bars.len(),
            "dropped duplicate timestamps"
        );
    }
    Ok(bars)
}

/// Instrument name for a CSV path: stem without a trailing `_minute`,
/// upper-cased.
pub fn symbol_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_suffix("_minute").unwrap_or(stem);
    if name.is_empty() {
        return None;
    }
    Some(name.to_uppercase())
}

/// List `*.csv` files in `dir` as instruments, sorted by symbol.
pub fn discover_instruments(dir: &Path) -> Result<Vec<InstrumentSource>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        if let Some(symbol) = symbol_from_path(&path) {
            found.push(InstrumentSource::csv(symbol, path));
        }
    }
    if found.is_empty() {
        return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
    }
    found.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(found)
}

/// Generate synthetic 1-minute bars for testing/development.
///
/// A random walk from 100.0, one bar per minute from `market_open` up to
/// (not including) `market_close` on every weekday in `[start, end]`. Seeded
/// from the symbol, so the same inputs always give the same bars.
pub fn generate_synthetic_minute_bars(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    market_open: NaiveTime,
    market_close: NaiveTime,
) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed_bytes = blake3::hash(symbol.as_bytes());
    let seed: [u8; 32] = *seed_bytes.as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let minutes_per_day = (market_close - market_open).num_minutes().max(0);
    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let day_open = current.and_time(market_open);
        for m in 0..minutes_per_day {
            let ret: f64 = rng.gen_range(-0.001..0.001);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.0005));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.0005));
            bars.push(Bar {
                timestamp: day_open + Duration::minutes(m),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(100..10_000u32) as f64,
            });
            price = close;
        }
        current += Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn synthetic(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        generate_synthetic_minute_bars(symbol, start, end, t(9, 15), t(15, 30))
    }

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parse_timestamp_formats() {
        let expected = d(2024, 1, 2).and_time(t(9, 15));
        assert_eq!(parse_timestamp("2024-01-02 09:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T09:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 09:15"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 09:15:00+05:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T09:15:00+05:30"), Some(expected));
        assert_eq!(parse_timestamp("02/01/2024 09:15"), None);
    }

    #[test]
    fn load_sorts_filters_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "abc_minute.csv",
            "date,open,high,low,close,volume\n\
             2024-01-03 09:16:00,2,2,2,2,10\n\
             2024-01-03 09:15:00,1,1,1,1,10\n\
             2024-01-03 09:15:00,9,9,9,9,10\n\
             2024-01-01 09:15:00,0,0,0,0,10\n\
             2024-01-05 09:15:00,5,5,5,5,10\n",
        );
        let bars = load_minute_bars(&path, d(2024, 1, 2), d(2024, 1, 4)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, d(2024, 1, 3).and_time(t(9, 15)));
        assert_eq!(bars[1].close, 2.0);
    }

    #[test]
    fn nan_price_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "gappy.csv",
            "date,open,high,low,close,volume\n\
             2024-01-03 09:15:00,1,1,1,NaN,10\n\
             2024-01-03 09:16:00,2,2,2,2,10\n",
        );
        let bars = load_minute_bars(&path, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 2.0);
    }

    #[test]
    fn end_date_is_inclusive_whole_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "x.csv",
            "date,open,high,low,close,volume\n2024-01-04 15:29:00,1,1,1,1,1\n",
        );
        let bars = load_minute_bars(&path, d(2024, 1, 4), d(2024, 1, 4)).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn bad_timestamp_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "bad.csv",
            "date,open,high,low,close,volume\n\
             2024-01-03 09:15:00,1,1,1,1,1\n\
             yesterday,1,1,1,1,1\n",
        );
        let err = load_minute_bars(&path, d(2024, 1, 1), d(2024, 12, 31)).unwrap_err();
        match err {
            LoadError::BadTimestamp { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected BadTimestamp, got {other}"),
        }
    }

    #[test]
    fn non_numeric_price_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "bad.csv",
            "date,open,high,low,close,volume\n2024-01-03 09:15:00,1,1,1,abc,1\n",
        );
        let err = load_minute_bars(&path, d(2024, 1, 1), d(2024, 12, 31)).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn discover_strips_suffix_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let header = "date,open,high,low,close,volume\n";
        write_csv(dir.path(), "tcs_minute.csv", header);
        write_csv(dir.path(), "INFY_minute.csv", header);
        write_csv(dir.path(), "nifty.csv", header);
        write_csv(dir.path(), "notes.txt", "ignore me");

        let found = discover_instruments(dir.path()).unwrap();
        let symbols: Vec<&str> = found.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["INFY", "NIFTY", "TCS"]);
        assert!(found.iter().all(|i| !i.is_synthetic()));
    }

    #[test]
    fn discover_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_instruments(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDirectory(_)));
    }

    #[test]
    fn synthetic_bars_cover_weekday_market_hours() {
        // 2024-01-05 is a Friday, 06/07 the weekend
        let bars = synthetic("SPY", d(2024, 1, 5), d(2024, 1, 8));
        assert_eq!(bars.len(), 2 * 375);
        assert_eq!(bars[0].timestamp, d(2024, 1, 5).and_time(t(9, 15)));
        assert_eq!(bars[374].timestamp, d(2024, 1, 5).and_time(t(15, 29)));
        assert_eq!(bars[375].timestamp.date(), d(2024, 1, 8));
        assert!(bars.iter().all(|b| b.low <= b.open.min(b.close)));
        assert!(bars.iter().all(|b| b.high >= b.open.max(b.close)));
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = synthetic("SPY", d(2024, 1, 1), d(2024, 1, 5));
        let b = synthetic("SPY", d(2024, 1, 1), d(2024, 1, 5));
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_get_different_synthetic_data() {
        let spy = synthetic("SPY", d(2024, 1, 1), d(2024, 1, 5));
        let qqq = synthetic("QQQ", d(2024, 1, 1), d(2024, 1, 5));
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }
}
