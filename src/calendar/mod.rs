//! Working-day arithmetic.
//!
//! Converts between calendar dates and business-day offsets under a
//! region's holiday set. Weekends (Saturday, Sunday) and declared holidays
//! are skipped; everything else is a working day.
//!
//! The free functions [`add_working_days`] and [`calculate_working_days`]
//! resolve the region against the built-in [`CalendarRegistry`]. Hosts with
//! configured calendars look a [`WorkingCalendar`] up in their own registry
//! and call its methods directly.
//!
//! # Round-trip
//! For every date `d`, offset `n` and registered region `r`:
//! `calculate_working_days(d, add_working_days(d, n, r)?, r)? == n`.

mod holidays;
mod region;
mod registry;
mod working;

pub use region::Region;
pub use registry::CalendarRegistry;
pub use working::{is_weekend, WorkingCalendar};

use chrono::NaiveDate;

use crate::error::ConfigurationError;

/// Advances `n` working days from `date` under `region`'s built-in calendar.
pub fn add_working_days(
    date: NaiveDate,
    n: i64,
    region: &str,
) -> Result<NaiveDate, ConfigurationError> {
    Ok(CalendarRegistry::shared()
        .get(region)?
        .add_working_days(date, n))
}

/// Signed working-day count from `start` to `end` under `region`'s built-in
/// calendar.
pub fn calculate_working_days(
    start: NaiveDate,
    end: NaiveDate,
    region: &str,
) -> Result<i64, ConfigurationError> {
    Ok(CalendarRegistry::shared()
        .get(region)?
        .working_days_between(start, end))
}
