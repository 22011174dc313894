//! Phase/task containment.
//!
//! Every task span must satisfy
//! `phase.start_date <= task.start_date && task.end_date <= phase.end_date`.
//!
//! - Task edits recompute the dependent field first, then check containment
//!   against the owning phase. A failing edit is rejected and the task is
//!   left as it was.
//! - Phase edits are never rejected for containment. Existing tasks are not
//!   moved or clamped; the tasks that no longer fit are reported so the
//!   caller can resolve them.
//!
//! All functions here are stateless checks over borrowed data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WorkingCalendar;
use crate::error::{Rejection, RejectionKind};
use crate::models::{DateSpan, Phase, Task};

/// A requested change to a task's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEdit {
    /// New start date; end date kept, working days re-derived.
    StartDate(NaiveDate),
    /// New end date; start date kept, working days re-derived.
    EndDate(NaiveDate),
    /// Both dates; working days re-derived.
    Dates { start: NaiveDate, end: NaiveDate },
    /// New duration; start date kept, end date re-derived.
    WorkingDays(i64),
}

/// A requested change to a phase's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEdit {
    /// Move the phase; duration kept. A non-working date snaps forward to
    /// the next working day.
    StartDate(NaiveDate),
    /// New end date; start kept, duration re-derived. A non-working date
    /// resolves to the last working day before it.
    EndDate(NaiveDate),
    /// New duration; start kept.
    WorkingDays(i64),
}

/// Schedule of a phase after an accepted [`PhaseEdit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSchedule {
    pub start_business_day: i64,
    pub working_days: i64,
}

/// Checks that `span` lies inside `phase_span`.
pub fn check_containment(
    task_id: &str,
    span: &DateSpan,
    phase_id: &str,
    phase_span: &DateSpan,
) -> Result<(), Rejection> {
    if phase_span.contains_span(span) {
        return Ok(());
    }
    Err(Rejection::new(
        RejectionKind::OutsidePhase,
        format!(
            "Task '{task_id}' span {span} falls outside phase '{phase_id}' span {phase_span}"
        ),
    ))
}

/// Validates a task about to be added to `phase`.
pub fn check_new_task(
    phase: &Phase,
    task: &Task,
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
) -> Result<(), Rejection> {
    if !task.is_consistent(calendar) {
        return Err(Rejection::new(
            RejectionKind::StaleDerivedField,
            format!(
                "Task '{}' working days {} disagree with its dates ({})",
                task.id,
                task.working_days(),
                task.derive_working_days(calendar)
            ),
        ));
    }
    check_containment(&task.id, &task.span(), &phase.id, &phase.span(calendar, epoch))
}

/// Computes the edited task, or rejects the edit.
///
/// The input task is never modified; on success the caller replaces it with
/// the returned value.
pub fn apply_task_edit(
    phase: &Phase,
    task: &Task,
    edit: TaskEdit,
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
) -> Result<Task, Rejection> {
    let (start, end) = match edit {
        TaskEdit::StartDate(start) => (start, task.end_date()),
        TaskEdit::EndDate(end) => (task.start_date(), end),
        TaskEdit::Dates { start, end } => (start, end),
        TaskEdit::WorkingDays(n) => {
            if n < 0 {
                return Err(Rejection::negative_duration(n));
            }
            let start = task.start_date();
            (start, calendar.add_working_days(start, n))
        }
    };

    let mut edited = task.clone();
    edited.reschedule(start, end, calendar)?;
    check_containment(
        &edited.id,
        &edited.span(),
        &phase.id,
        &phase.span(calendar, epoch),
    )?;
    Ok(edited)
}

/// Computes the phase schedule after an edit.
///
/// Only structural input is rejected (negative duration, end before start);
/// containment of existing tasks is reported by [`tasks_out_of_bounds`].
pub fn apply_phase_edit(
    phase: &Phase,
    edit: PhaseEdit,
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
) -> Result<PhaseSchedule, Rejection> {
    match edit {
        PhaseEdit::StartDate(date) => {
            let start = calendar.next_working_day(date);
            Ok(PhaseSchedule {
                start_business_day: calendar.working_days_between(epoch, start),
                working_days: phase.working_days(),
            })
        }
        PhaseEdit::EndDate(end) => {
            let start = phase.start_date(calendar, epoch);
            if end < start {
                return Err(Rejection::new(
                    RejectionKind::EndBeforeStart,
                    format!(
                        "Phase '{}' end date {end} precedes its start date {start}",
                        phase.id
                    ),
                ));
            }
            Ok(PhaseSchedule {
                start_business_day: phase.start_business_day(),
                working_days: calendar.working_days_between(start, end),
            })
        }
        PhaseEdit::WorkingDays(n) => {
            if n < 0 {
                return Err(Rejection::negative_duration(n));
            }
            Ok(PhaseSchedule {
                start_business_day: phase.start_business_day(),
                working_days: n,
            })
        }
    }
}

/// Ids of tasks whose span is not inside the phase's current span.
pub fn tasks_out_of_bounds(
    phase: &Phase,
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
) -> Vec<String> {
    let bounds = phase.span(calendar, epoch);
    phase
        .tasks
        .iter()
        .filter(|t| !bounds.contains_span(&t.span()))
        .map(|t| t.id.clone())
        .collect()
}
