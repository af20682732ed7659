//! Wilder RSI over session closes.
//!
//! The first defined value sits at row `window`, seeded by the simple mean
//! of the first `window` up and down moves. Later rows use Wilder smoothing
//! with weight `1 / window`. A flat seed reads 50.
//!
//! Values differ from the pandas `ta` RSI, which seeds its EWM at zero, is
//! defined from row `window - 1` and reads 100 whenever the down average is 0.

use crate::components::indicator::{closes, Column, Indicator};
use crate::domain::IndicatorRow;

use super::RSI;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    label: String,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "RSI window must be >= 1");
        Self {
            window,
            label: format!("rsi_{window}"),
        }
    }

    fn series(&self, closes: &[f64]) -> Vec<f64> {
        let mut out = vec![f64::NAN; closes.len()];
        if closes.len() <= self.window {
            return out;
        }

        let moves = |i: usize| {
            let delta = closes[i] - closes[i - 1];
            (delta.max(0.0), (-delta).max(0.0))
        };

        let (mut up, mut down) = (1..=self.window)
            .map(moves)
            .fold((0.0, 0.0), |(u, d), (g, l)| (u + g, d + l));
        if up.is_nan() || down.is_nan() {
            return out;
        }
        let w = self.window as f64;
        up /= w;
        down /= w;
        out[self.window] = strength_index(up, down);

        for i in (self.window + 1)..closes.len() {
            let (gain, loss) = moves(i);
            if gain.is_nan() || loss.is_nan() {
                break;
            }
            up = (up * (w - 1.0) + gain) / w;
            down = (down * (w - 1.0) + loss) / w;
            out[i] = strength_index(up, down);
        }
        out
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.label
    }

    fn compute(&self, rows: &[IndicatorRow]) -> Vec<Column> {
        vec![Column::new(RSI, self.series(&closes(rows)))]
    }
}

fn strength_index(up: f64, down: f64) -> f64 {
    match (up == 0.0, down == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        (true, _) => 0.0,
        _ => 100.0 * up / (up + down),
    }
}
