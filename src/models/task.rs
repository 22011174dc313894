//! Task model.
//!
//! A task is a unit of work owned by exactly one phase. Its calendar span
//! must lie inside the phase's span; that is enforced by
//! [`containment`](crate::containment), not here.
//!
//! `working_days` is derived from `(start_date, end_date)` under the
//! timeline's calendar and is recomputed on every write path. It has a
//! getter only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateSpan, Role};
use crate::calendar::WorkingCalendar;
use crate::error::{Rejection, RejectionKind};

/// Task progress. Any transition is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// A task inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier (unique within the timeline).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    working_days: i64,
    /// Planned effort (person-days).
    pub effort: f64,
    /// Suggested staffing role. Advisory only.
    pub default_role: Option<Role>,
    /// Progress.
    pub status: TaskStatus,
}

impl Task {
    /// Creates a task spanning `[start, end]`, deriving `working_days`.
    ///
    /// Rejects `end < start`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        calendar: &WorkingCalendar,
    ) -> Result<Self, Rejection> {
        let id = id.into();
        check_order(&id, start, end)?;
        Ok(Self {
            working_days: calendar.working_days_between(start, end),
            id,
            name: name.into(),
            start_date: start,
            end_date: end,
            effort: 0.0,
            default_role: None,
            status: TaskStatus::NotStarted,
        })
    }

    /// Creates a task lasting `working_days` from `start`.
    pub fn with_duration(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        working_days: i64,
        calendar: &WorkingCalendar,
    ) -> Result<Self, Rejection> {
        if working_days < 0 {
            return Err(Rejection::negative_duration(working_days));
        }
        let end = calendar.add_working_days(start, working_days);
        Self::new(id, name, start, end, calendar)
    }

    /// Sets the planned effort.
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = effort;
        self
    }

    /// Sets the advisory role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.default_role = Some(role);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Working days between start and end (derived).
    pub fn working_days(&self) -> i64 {
        self.working_days
    }

    /// Calendar span of the task.
    pub fn span(&self) -> DateSpan {
        DateSpan::new(self.start_date, self.end_date)
    }

    /// Recomputes `working_days` from the stored dates.
    pub fn derive_working_days(&self, calendar: &WorkingCalendar) -> i64 {
        calendar.working_days_between(self.start_date, self.end_date)
    }

    /// Whether the stored `working_days` matches the calendar.
    pub fn is_consistent(&self, calendar: &WorkingCalendar) -> bool {
        self.working_days == self.derive_working_days(calendar)
    }

    /// Moves the task to `[start, end]` and re-derives `working_days`.
    pub(crate) fn reschedule(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        calendar: &WorkingCalendar,
    ) -> Result<(), Rejection> {
        check_order(&self.id, start, end)?;
        self.start_date = start;
        self.end_date = end;
        self.working_days = calendar.working_days_between(start, end);
        Ok(())
    }
}

fn check_order(task_id: &str, start: NaiveDate, end: NaiveDate) -> Result<(), Rejection> {
    if end < start {
        return Err(Rejection::new(
            RejectionKind::EndBeforeStart,
            format!("Task '{task_id}' end date {end} precedes its start date {start}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cal() -> WorkingCalendar {
        WorkingCalendar::new("T1")
    }

    #[test]
    fn test_task_derives_working_days() {
        // Mon 2025-01-06 .. Mon 2025-01-13 = 5 working days
        let t = Task::new("T1", "Blueprint", d(2025, 1, 6), d(2025, 1, 13), &cal()).unwrap();
        assert_eq!(t.working_days(), 5);
        assert!(t.is_consistent(&cal()));
        assert_eq!(t.status, TaskStatus::NotStarted);
    }

    #[test]
    fn test_task_with_duration() {
        let t = Task::with_duration("T1", "Build", d(2025, 1, 6), 5, &cal())
            .unwrap()
            .with_effort(4.5)
            .with_role(Role::Developer)
            .with_status(TaskStatus::InProgress);
        assert_eq!(t.end_date(), d(2025, 1, 13));
        assert!((t.effort - 4.5).abs() < 1e-9);
        assert_eq!(t.default_role, Some(Role::Developer));
        assert_eq!(t.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_task_rejects_end_before_start() {
        let err = Task::new("T1", "x", d(2025, 1, 6), d(2025, 1, 3), &cal()).unwrap_err();
        assert_eq!(err.kind, RejectionKind::EndBeforeStart);

        let err = Task::with_duration("T1", "x", d(2025, 1, 6), -1, &cal()).unwrap_err();
        assert_eq!(err.kind, RejectionKind::NegativeDuration);
    }

    #[test]
    fn test_reschedule_keeps_state_on_rejection() {
        let mut t = Task::new("T1", "x", d(2025, 1, 6), d(2025, 1, 13), &cal()).unwrap();
        assert!(t.reschedule(d(2025, 1, 20), d(2025, 1, 6), &cal()).is_err());
        assert_eq!(t.start_date(), d(2025, 1, 6));
        assert_eq!(t.working_days(), 5);

        t.reschedule(d(2025, 1, 6), d(2025, 1, 20), &cal()).unwrap();
        assert_eq!(t.working_days(), 10);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
        let s: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(s, TaskStatus::InProgress);
    }
}
