//! Working-day calendar.
//!
//! # Day Model
//! A date is a working day iff it is not a Saturday or Sunday AND it is not
//! listed in the calendar's holiday set. Holidays falling on a weekend have
//! no extra effect.
//!
//! # Counting Convention
//! [`WorkingCalendar::add_working_days`] steps one calendar day at a time and
//! counts only working days. [`WorkingCalendar::working_days_between`] is its
//! inverse:
//! - forward (`end >= start`): working days in `(start, end]`
//! - backward (`end < start`): minus the working days in `[end, start)`
//!
//! so that `working_days_between(d, add_working_days(d, n)) == n` for every
//! date `d` and offset `n`, including when `d` itself is a weekend or holiday.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Region;

/// Business-day calendar for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCalendar {
    /// Region this calendar belongs to.
    pub region: Region,
    /// Declared public holidays.
    pub holidays: BTreeSet<NaiveDate>,
}

impl WorkingCalendar {
    /// Creates a weekend-only calendar (no holidays).
    pub fn new(region: impl Into<Region>) -> Self {
        Self {
            region: region.into(),
            holidays: BTreeSet::new(),
        }
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Adds several holidays.
    pub fn with_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(dates);
        self
    }

    /// Whether `date` is a declared holiday.
    #[inline]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Whether `date` is a working day.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// First working day at or after `date`.
    ///
    /// Returns `date` itself if it is already a working day.
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_working_day(current) {
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Date reached by advancing `n` working days from `date`.
    ///
    /// Negative `n` moves backward. `n == 0` returns `date` unchanged, even
    /// when `date` is not a working day.
    pub fn add_working_days(&self, date: NaiveDate, n: i64) -> NaiveDate {
        let forward = n >= 0;
        let mut remaining = n.unsigned_abs();
        let mut current = date;

        while remaining > 0 {
            let step = if forward {
                current.succ_opt()
            } else {
                current.pred_opt()
            };
            match step {
                Some(next) => current = next,
                None => break, // chrono date range exhausted
            }
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        current
    }

    /// Signed number of working days from `start` to `end`.
    ///
    /// See the module docs for the exact interval convention.
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end >= start {
            self.count_working_days(start, end, false)
        } else {
            -self.count_working_days(end, start, true)
        }
    }

    /// Counts working days in `(from, to]`, or `[from, to)` when
    /// `include_from` is set. Requires `from <= to`.
    fn count_working_days(&self, from: NaiveDate, to: NaiveDate, include_from: bool) -> i64 {
        let mut count = 0;
        let mut current = from;

        if include_from {
            while current < to {
                if self.is_working_day(current) {
                    count += 1;
                }
                match current.succ_opt() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        } else {
            while current < to {
                match current.succ_opt() {
                    Some(next) => current = next,
                    None => break,
                }
                if self.is_working_day(current) {
                    count += 1;
                }
            }
        }

        count
    }

    /// Holidays falling on working weekdays within `[start, end]`.
    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if end < start {
            return Vec::new();
        }
        self.holidays
            .range(start..=end)
            .copied()
            .filter(|d| !is_weekend(*d))
            .collect()
    }
}

/// Saturday or Sunday.
#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
