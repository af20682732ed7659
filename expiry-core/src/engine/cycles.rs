//! Cycle partitioner: split the indicator series into expiry cycles.
//!
//! For consecutive expiries `(e[i], e[i+1])` the cycle runs from the day after
//! `e[i]` (or the first date in the series, for i = 0) through `e[i+1]`
//! inclusive. N expiries yield N-1 cycles.

use chrono::{Days, NaiveDate};

use crate::domain::{ExpiryCycle, IndicatorRow};

/// A cycle and the rows that fall inside it, borrowed from the full series.
#[derive(Debug, Clone, Copy)]
pub struct CycleRows<'a> {
    pub cycle: ExpiryCycle,
    pub rows: &'a [IndicatorRow],
}

/// Partition time-ordered rows by an ascending, duplicate-free expiry list.
///
/// Fewer than two expiries, or an empty series, yields no cycles.
pub fn partition<'a>(rows: &'a [IndicatorRow], expiries: &[NaiveDate]) -> Vec<CycleRows<'a>> {
    debug_assert!(
        expiries.windows(2).all(|w| w[0] < w[1]),
        "expiries must be strictly ascending"
    );

    let Some(first_date) = rows.first().map(IndicatorRow::date) else {
        return Vec::new();
    };

    expiries
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let start_date = if i == 0 {
                first_date
            } else {
                pair[0]
                    .checked_add_days(Days::new(1))
                    .unwrap_or(NaiveDate::MAX)
            };
            let cycle = ExpiryCycle {
                start_date,
                end_date: pair[1],
            };
            CycleRows {
                cycle,
                rows: rows_in(rows, &cycle),
            }
        })
        .collect()
}

/// Rows with `start_date <= date <= end_date`. Rows are date-ordered, so the
/// members form one contiguous run.
fn rows_in<'a>(rows: &'a [IndicatorRow], cycle: &ExpiryCycle) -> &'a [IndicatorRow] {
    let lo = rows.partition_point(|r| r.date() < cycle.start_date);
    let hi = rows.partition_point(|r| r.date() <= cycle.end_date);
    let members = &rows[lo..hi.max(lo)];
    debug_assert!(members.iter().all(|r| cycle.contains(r.date())));
    members
}
