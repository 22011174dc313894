//! Structural validation of timeline data.
//!
//! Used on data arriving from outside the engine (a saved document, a
//! regenerated candidate) and by the individual edit operations for their
//! field checks. Detects:
//! - Duplicate ids (phases, tasks across the timeline, resources in a phase)
//! - Negative durations and effort
//! - Allocation outside 0..=200 and unusable hourly rates
//! - Task `working_days` that disagree with the calendar
//! - Tasks outside their phase
//! - Integration records pointing at missing phases

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::calendar::WorkingCalendar;
use crate::containment::check_containment;
use crate::error::{Rejection, RejectionKind};
use crate::models::{IntegrationRecord, Phase, Resource, MAX_ALLOCATION};

/// Validation result.
pub type ValidationResult = Result<(), Vec<Rejection>>;

/// How [`validate_timeline_with`] treats tasks outside their phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// A task outside its phase is a rejection.
    Enforce,
    /// Tasks outside their phase pass; callers report them as warnings.
    Report,
}

/// Validates a complete phase set.
///
/// Checks:
/// 1. No duplicate phase ids
/// 2. No duplicate task ids (across all phases)
/// 3. No duplicate resource ids within a phase
/// 4. Phase working days and effort are non-negative
/// 5. Resource allocation and rate are in range
/// 6. Task effort is non-negative
/// 7. Task working days match their dates under `calendar`
/// 8. Every task lies inside its phase
/// 9. Integration records reference existing phases
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(rejections)` with every detected issue.
pub fn validate_timeline(
    phases: &[Phase],
    integrations: &[IntegrationRecord],
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
) -> ValidationResult {
    validate_timeline_with(phases, integrations, calendar, epoch, Containment::Enforce)
}

/// [`validate_timeline`] with a choice of containment handling.
///
/// Saved documents may legitimately hold tasks outside a phase that was
/// shortened after they were added; those load with [`Containment::Report`].
pub fn validate_timeline_with(
    phases: &[Phase],
    integrations: &[IntegrationRecord],
    calendar: &WorkingCalendar,
    epoch: NaiveDate,
    containment: Containment,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut phase_ids = HashSet::new();
    let mut task_ids = HashSet::new();

    for phase in phases {
        if !phase_ids.insert(phase.id.as_str()) {
            errors.push(Rejection::new(
                RejectionKind::DuplicateId,
                format!("Duplicate phase ID: {}", phase.id),
            ));
        }

        if let Err(e) = check_working_days(phase.working_days()) {
            errors.push(e);
        }
        if let Err(e) = check_effort(phase.effort) {
            errors.push(e);
        }

        let mut resource_ids = HashSet::new();
        for resource in &phase.resources {
            if !resource_ids.insert(resource.id.as_str()) {
                errors.push(Rejection::new(
                    RejectionKind::DuplicateId,
                    format!("Duplicate resource ID in phase '{}': {}", phase.id, resource.id),
                ));
            }
            errors.extend(check_resource(resource).err());
        }

        let bounds = phase.span(calendar, epoch);
        for task in &phase.tasks {
            if !task_ids.insert(task.id.as_str()) {
                errors.push(Rejection::new(
                    RejectionKind::DuplicateId,
                    format!("Duplicate task ID: {}", task.id),
                ));
            }
            if let Err(e) = check_effort(task.effort) {
                errors.push(e);
            }
            if !task.is_consistent(calendar) {
                errors.push(Rejection::new(
                    RejectionKind::StaleDerivedField,
                    format!(
                        "Task '{}' stores {} working days but its dates give {}",
                        task.id,
                        task.working_days(),
                        task.derive_working_days(calendar)
                    ),
                ));
            }
            if containment == Containment::Enforce {
                errors.extend(check_containment(&task.id, &task.span(), &phase.id, &bounds).err());
            }
        }
    }

    for record in integrations {
        for end in [&record.from_phase, &record.to_phase] {
            if !phase_ids.contains(end.as_str()) {
                errors.push(Rejection::new(
                    RejectionKind::UnknownPhase,
                    format!(
                        "Integration '{}' references unknown phase '{}'",
                        record.id, end
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rejects negative working-day durations.
pub fn check_working_days(working_days: i64) -> Result<(), Rejection> {
    if working_days < 0 {
        return Err(Rejection::negative_duration(working_days));
    }
    Ok(())
}

/// Rejects negative or non-finite effort.
pub fn check_effort(effort: f64) -> Result<(), Rejection> {
    if !effort.is_finite() || effort < 0.0 {
        return Err(Rejection::negative_effort(effort));
    }
    Ok(())
}

/// Rejects allocation outside `0..=200` percent.
pub fn check_allocation(allocation: f64) -> Result<(), Rejection> {
    if !(0.0..=MAX_ALLOCATION).contains(&allocation) {
        return Err(Rejection::new(
            RejectionKind::AllocationOutOfRange,
            format!("Allocation must be between 0% and {MAX_ALLOCATION}%, got {allocation}%"),
        ));
    }
    Ok(())
}

/// Rejects negative or non-finite hourly rates.
pub fn check_rate(hourly_rate: f64) -> Result<(), Rejection> {
    if !hourly_rate.is_finite() || hourly_rate < 0.0 {
        return Err(Rejection::new(
            RejectionKind::NegativeRate,
            format!("Hourly rate must be a non-negative amount, got {hourly_rate}"),
        ));
    }
    Ok(())
}

/// Allocation and rate checks for one resource.
pub fn check_resource(resource: &Resource) -> Result<(), Rejection> {
    check_allocation(resource.allocation)?;
    check_rate(resource.hourly_rate)
}
