//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three columns from one instance:
//! - `sma`: SMA(close, period)
//! - `upper_bb`: sma + dev * stddev(close, period)
//! - `lower_bb`: sma - dev * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use crate::components::indicator::{closes, Column, Indicator};
use crate::domain::IndicatorRow;

use super::{LOWER_BB, SMA, UPPER_BB};

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, rows: &[IndicatorRow]) -> Vec<Column> {
        let closes = closes(rows);
        let n = closes.len();
        let mut middle = vec![f64::NAN; n];
        let mut upper = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];

        if n >= self.period {
            for i in (self.period - 1)..n {
                let window = &closes[i + 1 - self.period..=i];
                if window.iter().any(|c| c.is_nan()) {
                    continue;
                }

                let mean = window.iter().sum::<f64>() / self.period as f64;
                let variance = window
                    .iter()
                    .map(|c| {
                        let diff = c - mean;
                        diff * diff
                    })
                    .sum::<f64>()
                    / self.period as f64;
                let stddev = variance.sqrt();

                middle[i] = mean;
                upper[i] = mean + self.multiplier * stddev;
                lower[i] = mean - self.multiplier * stddev;
            }
        }

        vec![
            Column::new(SMA, middle),
            Column::new(UPPER_BB, upper),
            Column::new(LOWER_BB, lower),
        ]
    }
}
