//! Region → calendar lookup.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::holidays::{self, HolidayDate};
use super::{Region, WorkingCalendar};
use crate::error::ConfigurationError;

static BUILTIN: Lazy<CalendarRegistry> = Lazy::new(CalendarRegistry::builtin);

/// Holiday calendars keyed by region.
///
/// Lookups never fall back: a region with no registered calendar is a
/// [`ConfigurationError::UnknownRegion`], not a weekend-only calendar.
#[derive(Debug, Clone, Default)]
pub struct CalendarRegistry {
    calendars: HashMap<Region, WorkingCalendar>,
}

impl CalendarRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Malaysia, Singapore and Vietnam calendars.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(from_table(Region::malaysia(), holidays::MALAYSIA));
        registry.insert(from_table(Region::singapore(), holidays::SINGAPORE));
        registry.insert(from_table(Region::vietnam(), holidays::VIETNAM));
        registry
    }

    /// Shared built-in registry.
    pub fn shared() -> &'static CalendarRegistry {
        &BUILTIN
    }

    /// Registers (or replaces) a calendar under its region.
    pub fn insert(&mut self, calendar: WorkingCalendar) {
        self.calendars.insert(calendar.region.clone(), calendar);
    }

    /// Adds holidays to a region's calendar, creating a weekend-only
    /// calendar first if the region is new.
    pub fn extend_holidays(
        &mut self,
        region: &Region,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) {
        self.calendars
            .entry(region.clone())
            .or_insert_with(|| WorkingCalendar::new(region.clone()))
            .holidays
            .extend(dates);
    }

    /// Looks up the calendar for a region key.
    pub fn get(&self, region: &str) -> Result<&WorkingCalendar, ConfigurationError> {
        let key = Region::new(region);
        self.calendars
            .get(&key)
            .ok_or_else(|| ConfigurationError::UnknownRegion(key.to_string()))
    }

    /// Whether a calendar is registered for the region key.
    pub fn contains(&self, region: &str) -> bool {
        self.calendars.contains_key(&Region::new(region))
    }

    /// Registered region keys, sorted.
    pub fn regions(&self) -> Vec<&Region> {
        let mut keys: Vec<&Region> = self.calendars.keys().collect();
        keys.sort();
        keys
    }
}

fn from_table(region: Region, table: &[HolidayDate]) -> WorkingCalendar {
    WorkingCalendar::new(region).with_holidays(
        table
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
    )
}
