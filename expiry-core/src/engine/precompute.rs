//! Indicator pipeline.
//!
//! Indicators are applied once, in order, to the full session series. Each
//! indicator sees the columns merged by its predecessors. The merge step
//! rejects columns whose length differs from the row count and names that
//! collide with an existing column.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::components::indicator::Indicator;
use crate::domain::{IndicatorRow, SessionBar};

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("indicator '{indicator}' produced {got} values for column '{column}', expected {expected}")]
    LengthMismatch {
        indicator: String,
        column: String,
        got: usize,
        expected: usize,
    },
    #[error("indicator '{indicator}' emitted column '{column}' which already exists")]
    DuplicateColumn { indicator: String, column: String },
}

/// Apply indicators in sequence and merge their columns onto the session bars.
///
/// Row order and count are preserved. The input is not modified.
pub fn apply_indicators(
    bars: &[SessionBar],
    indicators: &[Box<dyn Indicator>],
) -> Result<Vec<IndicatorRow>, IndicatorError> {
    let mut rows: Vec<IndicatorRow> = bars.iter().cloned().map(IndicatorRow::new).collect();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for indicator in indicators {
        let columns = indicator.compute(&rows);
        for column in columns {
            if column.values.len() != rows.len() {
                return Err(IndicatorError::LengthMismatch {
                    indicator: indicator.name().to_string(),
                    column: column.name,
                    got: column.values.len(),
                    expected: rows.len(),
                });
            }
            if !seen.insert(column.name.clone()) {
                return Err(IndicatorError::DuplicateColumn {
                    indicator: indicator.name().to_string(),
                    column: column.name,
                });
            }
            for (row, value) in rows.iter_mut().zip(column.values) {
                row.values.insert(column.name.clone(), value);
            }
        }
    }

    Ok(rows)
}
