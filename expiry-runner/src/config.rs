//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! start_date = "2023-01-01"
//! end_date = "2023-12-31"
//! data_dir = "data"
//!
//! [session]
//! interval = "15min"
//!
//! [signals]
//! bull = [{ type = "close_below_lower_band" }, { type = "rsi_oversold", threshold = 25.0 }]
//! ```

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use expiry_core::components::SignalChecks;
use expiry_core::engine::{SessionSpec, StrategyParams};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub indicators: IndicatorSection,
    #[serde(default)]
    pub signals: SignalChecks,
    #[serde(default)]
    pub options: OptionsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    /// First trading day kept (inclusive).
    pub start_date: NaiveDate,
    /// Last trading day kept (inclusive).
    pub end_date: NaiveDate,
    /// Folder of `<NAME>_minute.csv` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Worker threads for the batch. 0 = rayon default, 1 = sequential.
    #[serde(default)]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// Pandas-style offset: `15min`, `30m`, `2h`, `4H`, `1D`.
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_market_open")]
    pub market_open: String,
    #[serde(default = "default_market_close")]
    pub market_close: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            market_open: default_market_open(),
            market_close: default_market_close(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSection {
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,
    #[serde(default = "default_bb_window")]
    pub bb_window: usize,
    #[serde(default = "default_bb_dev")]
    pub bb_dev: f64,
}

impl Default for IndicatorSection {
    fn default() -> Self {
        Self {
            rsi_window: default_rsi_window(),
            bb_window: default_bb_window(),
            bb_dev: default_bb_dev(),
        }
    }
}

/// Option-leg settings. Recorded with results; no computation reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionsSection {
    #[serde(default = "default_strike_diff")]
    pub strike_diff: u32,
}

impl Default for OptionsSection {
    fn default() -> Self {
        Self {
            strike_diff: default_strike_diff(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_interval() -> String {
    "1D".to_string()
}

fn default_market_open() -> String {
    "09:15".to_string()
}

fn default_market_close() -> String {
    "15:30".to_string()
}

fn default_rsi_window() -> usize {
    14
}

fn default_bb_window() -> usize {
    20
}

fn default_bb_dev() -> f64 {
    2.0
}

fn default_strike_diff() -> u32 {
    50
}

impl BacktestConfig {
    /// Config with every section at its default.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backtest: BacktestSection {
                start_date,
                end_date,
                data_dir: data_dir.into(),
                threads: 0,
            },
            session: SessionSection::default(),
            indicators: IndicatorSection::default(),
            signals: SignalChecks::default(),
            options: OptionsSection::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.start_date > self.backtest.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} is after end_date {}",
                self.backtest.start_date, self.backtest.end_date
            )));
        }
        // Builds and checks interval and market hours
        self.session_spec()?;

        if self.indicators.rsi_window == 0 {
            return Err(ConfigError::Invalid("rsi_window must be >= 1".into()));
        }
        if self.indicators.bb_window == 0 {
            return Err(ConfigError::Invalid("bb_window must be >= 1".into()));
        }
        if self.indicators.bb_dev <= 0.0 || !self.indicators.bb_dev.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "bb_dev must be positive, got {}",
                self.indicators.bb_dev
            )));
        }
        if self.signals.bull.is_empty() {
            return Err(ConfigError::Invalid("signals.bull must not be empty".into()));
        }
        if self.signals.bear.is_empty() {
            return Err(ConfigError::Invalid("signals.bear must not be empty".into()));
        }
        Ok(())
    }

    /// Session layout from the `[session]` section.
    pub fn session_spec(&self) -> Result<SessionSpec, ConfigError> {
        let interval = parse_interval(&self.session.interval)?;
        let open = parse_clock(&self.session.market_open)?;
        let close = parse_clock(&self.session.market_close)?;
        SessionSpec::new(interval, open, close).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Engine parameters for one instrument run.
    pub fn to_strategy_params(&self) -> Result<StrategyParams, ConfigError> {
        Ok(StrategyParams {
            session: self.session_spec()?,
            rsi_window: self.indicators.rsi_window,
            bb_window: self.indicators.bb_window,
            bb_dev: self.indicators.bb_dev,
            checks: self.signals.clone(),
        })
    }

    /// Deterministic BLAKE3 hex digest of the serialized config.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("config not serializable: {e}")))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// Parse a pandas-style offset alias into a duration.
///
/// Accepts a positive integer followed by a unit: `min`/`m`/`T` (minutes),
/// `h`/`H` (hours), `d`/`D` (days). A bare unit means 1.
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    let count: i64 = if digits.is_empty() {
        1
    } else {
        digits
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("bad interval count in '{s}'")))?
    };
    if count <= 0 {
        return Err(ConfigError::Invalid(format!(
            "interval must be positive, got '{s}'"
        )));
    }

    let interval = match unit {
        "min" | "m" | "T" => Duration::try_minutes(count),
        "h" | "H" => Duration::try_hours(count),
        "d" | "D" => Duration::try_days(count),
        _ => {
            return Err(ConfigError::Invalid(format!(
                "unknown interval unit in '{s}' (expected min, h or D)"
            )))
        }
    };
    interval.ok_or_else(|| ConfigError::Invalid(format!("interval '{s}' is out of range")))
}

fn parse_clock(s: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| ConfigError::Invalid(format!("bad clock time '{s}' (expected HH:MM)")))
}
