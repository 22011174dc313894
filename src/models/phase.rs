//! Phase model.
//!
//! A phase is a contiguous block of working days in the timeline, owning
//! its tasks and resources.
//!
//! # Time Representation
//! A phase stores only `start_business_day` (offset from the timeline
//! epoch) and `working_days`. Calendar dates are computed on read:
//!
//! - `start_date = add_working_days(epoch, start_business_day)`
//! - `end_date   = add_working_days(start_date, working_days)`
//!
//! so the three of `{start_date, end_date, working_days}` can never drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateSpan, Resource, Task};
use crate::calendar::WorkingCalendar;

/// A timeline phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Unique phase identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Grouping label (e.g. "Prepare", "Realize").
    pub category: String,
    /// Position in the timeline sequence.
    pub order: i32,
    start_business_day: i64,
    working_days: i64,
    /// Authorized effort budget (person-days).
    pub effort: f64,
    /// Staffed resources.
    pub resources: Vec<Resource>,
    /// Owned tasks.
    pub tasks: Vec<Task>,
}

impl Phase {
    /// Creates an empty phase at offset 0 with zero duration.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            order: 0,
            start_business_day: 0,
            working_days: 0,
            effort: 0.0,
            resources: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the sequence position.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Sets start offset and duration (working days).
    pub fn with_schedule(mut self, start_business_day: i64, working_days: i64) -> Self {
        self.start_business_day = start_business_day;
        self.working_days = working_days;
        self
    }

    /// Sets the authorized effort budget.
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = effort;
        self
    }

    /// Adds a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Offset of the first working day from the timeline epoch.
    pub fn start_business_day(&self) -> i64 {
        self.start_business_day
    }

    /// Duration in working days.
    pub fn working_days(&self) -> i64 {
        self.working_days
    }

    /// Offset reached at the end of the phase.
    pub fn end_business_day(&self) -> i64 {
        self.start_business_day + self.working_days
    }

    pub fn start_date(&self, calendar: &WorkingCalendar, epoch: NaiveDate) -> NaiveDate {
        calendar.add_working_days(epoch, self.start_business_day)
    }

    pub fn end_date(&self, calendar: &WorkingCalendar, epoch: NaiveDate) -> NaiveDate {
        calendar.add_working_days(self.start_date(calendar, epoch), self.working_days)
    }

    /// Calendar span `[start_date, end_date]`.
    pub fn span(&self, calendar: &WorkingCalendar, epoch: NaiveDate) -> DateSpan {
        let start = self.start_date(calendar, epoch);
        DateSpan::new(start, calendar.add_working_days(start, self.working_days))
    }

    pub(crate) fn set_schedule(&mut self, start_business_day: i64, working_days: i64) {
        self.start_business_day = start_business_day;
        self.working_days = working_days;
    }

    /// Finds a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub(crate) fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    /// Finds a resource by id.
    pub fn resource(&self, resource_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == resource_id)
    }

    pub(crate) fn resource_index(&self, resource_id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.id == resource_id)
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
