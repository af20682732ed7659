//! Indicator trait and the named-column output it produces.
//!
//! Indicators are pure functions: session rows in, named numeric columns out.
//! Every column is positionally aligned with the input rows. Warm-up
//! positions hold `f64::NAN`, never an approximation.

use crate::domain::IndicatorRow;

/// One named output series, aligned with the rows it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Trait for indicators.
///
/// `compute` receives the rows with every column merged by indicators applied
/// before it, so an indicator may read an earlier indicator's output.
///
/// # Look-ahead contamination guard
/// No value at row t may depend on rows t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "bollinger_20_2").
    fn name(&self) -> &str;

    /// Compute one or more named columns, each the same length as `rows`.
    fn compute(&self, rows: &[IndicatorRow]) -> Vec<Column>;
}

/// Close series of a row slice.
pub fn closes(rows: &[IndicatorRow]) -> Vec<f64> {
    rows.iter().map(|r| r.bar.close).collect()
}
