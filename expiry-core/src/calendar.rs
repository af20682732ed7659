//! Monthly expiry calendar.
//!
//! Expiry is the last Thursday of each month. When that Thursday has no
//! trading data (a holiday), the expiry rolls back to the nearest earlier day
//! of the same week that does. A month with no data in that week keeps the
//! nominal Thursday, so its signals evaluate as unresolved.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Last Thursday of the given month, or `None` for an invalid month.
pub fn last_thursday(year: i32, month: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    let back = (last.weekday().num_days_from_monday() + 7
        - Weekday::Thu.num_days_from_monday())
        % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// Adjust a nominal expiry to the nearest earlier trading day in its week.
fn roll_back(nominal: NaiveDate, trading_days: &BTreeSet<NaiveDate>) -> NaiveDate {
    if trading_days.is_empty() || trading_days.contains(&nominal) {
        return nominal;
    }
    let days_into_week = nominal.weekday().num_days_from_monday();
    let Some(week_start) = nominal.checked_sub_days(Days::new(u64::from(days_into_week))) else {
        return nominal;
    };
    trading_days
        .range(week_start..nominal)
        .next_back()
        .copied()
        .unwrap_or(nominal)
}

/// Expiry dates for every month from `start`'s month through `end`'s month,
/// ascending and duplicate-free.
///
/// The end month's expiry is kept even when it falls after `end`, so the
/// trailing partial cycle is still partitioned; its signals evaluate as
/// unresolved. An empty `trading_days` set disables holiday adjustment.
pub fn monthly_expiries(
    start: NaiveDate,
    end: NaiveDate,
    trading_days: &BTreeSet<NaiveDate>,
) -> Vec<NaiveDate> {
    let mut expiries = Vec::new();
    if start > end {
        return expiries;
    }

    let (mut year, mut month) = (start.year(), start.month());
    loop {
        if (year, month) > (end.year(), end.month()) {
            break;
        }
        if let Some(nominal) = last_thursday(year, month) {
            let expiry = roll_back(nominal, trading_days);
            if expiries.last().map_or(true, |&prev| prev < expiry) {
                expiries.push(expiry);
            }
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    expiries
}
