//! Calendar date spans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed date span `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
}

impl DateSpan {
    /// Creates a span. No ordering check; see [`DateSpan::is_ordered`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `start <= end`.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Whether `other` lies fully inside this span (bounds included).
    #[inline]
    pub fn contains_span(&self, other: &DateSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether a date lies inside this span (bounds included).
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether two spans share at least one date.
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
