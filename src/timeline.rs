//! Timeline aggregate.
//!
//! Owns the complete engine state for one project document: epoch, region
//! calendar, rate card, phases, manual overrides and integration records.
//! Every mutation is one atomic step: the edit is validated and derived
//! fields are recomputed on local copies, and only an accepted result is
//! written back. A rejected edit leaves the timeline exactly as it was.
//!
//! Successful hand edits record a [`ManualOverride`] so a later
//! regeneration can warn before discarding them.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_timeline::calendar::CalendarRegistry;
//! use u_timeline::models::{Phase, Resource, Role};
//! use u_timeline::timeline::Timeline;
//!
//! let epoch = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let mut timeline = Timeline::new(epoch, "MY", &CalendarRegistry::builtin()).unwrap();
//! timeline.add_phase(Phase::new("P1", "Explore").with_schedule(0, 20)).unwrap();
//!
//! let outcome = timeline
//!     .add_resource("P1", Resource::new("R1", Role::Consultant, "MY").with_hourly_rate(180.0))
//!     .unwrap();
//! assert_eq!(outcome.project_cost, 28_800.0);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::calendar::{CalendarRegistry, Region, WorkingCalendar};
use crate::containment::{
    apply_phase_edit, apply_task_edit, check_new_task, tasks_out_of_bounds, PhaseEdit, TaskEdit,
};
use crate::costing::{phase_cost, project_cost, RateCard};
use crate::diff::{ConfirmedRegeneration, RegenerateDiff};
use crate::effort::EffortBudget;
use crate::error::{ConfigurationError, EngineError, Rejection, RejectionKind};
use crate::models::{
    DateSpan, IntegrationRecord, ManualOverride, OverrideField, Phase, RateSource, Resource, Role,
    Task, TaskStatus, Warning,
};
use crate::validation::{
    check_allocation, check_effort, check_rate, validate_timeline, validate_timeline_with,
    Containment,
};

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Advisory warnings raised by this mutation.
    pub warnings: Vec<Warning>,
    /// Recomputed cost of the affected phase, if the mutation targeted one
    /// that still exists.
    pub phase_cost: Option<f64>,
    /// Recomputed project cost.
    pub project_cost: f64,
}

/// Field changes for [`Timeline::edit_resource`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceEdit {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub region: Option<Region>,
    pub allocation: Option<f64>,
    /// Setting a rate marks it manual.
    pub hourly_rate: Option<f64>,
}

/// Persistable form of a timeline.
///
/// The engine treats persistence as pass-through: this is what the host
/// saves and hands back to [`Timeline::restore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub epoch: NaiveDate,
    pub region: Region,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub overrides: Vec<ManualOverride>,
    #[serde(default)]
    pub integrations: Vec<IntegrationRecord>,
}

/// Timeline state for one project.
#[derive(Debug, Clone)]
pub struct Timeline {
    epoch: NaiveDate,
    calendar: WorkingCalendar,
    rate_card: RateCard,
    phases: Vec<Phase>,
    overrides: Vec<ManualOverride>,
    integrations: Vec<IntegrationRecord>,
}

impl Timeline {
    /// Creates an empty timeline using `region`'s calendar from `registry`.
    pub fn new(
        epoch: NaiveDate,
        region: &str,
        registry: &CalendarRegistry,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            epoch,
            calendar: registry.get(region)?.clone(),
            rate_card: RateCard::default(),
            phases: Vec::new(),
            overrides: Vec::new(),
            integrations: Vec::new(),
        })
    }

    /// Replaces the rate card used for suggestions.
    pub fn with_rate_card(mut self, rate_card: RateCard) -> Self {
        self.rate_card = rate_card;
        self
    }

    /// Installs a freshly generated phase set. No manual overrides exist yet.
    ///
    /// Resources without a manual rate get the rate card's suggestion.
    pub fn install_generated(
        &mut self,
        phases: Vec<Phase>,
    ) -> Result<MutationOutcome, EngineError> {
        let (phases, mut warnings) = self.prepare_phases(phases)?;
        self.phases = phases;
        self.overrides.clear();
        self.integrations.clear();
        info!(phases = self.phases.len(), "generated timeline installed");
        warnings.extend(self.warnings());
        Ok(self.outcome(None, warnings))
    }

    /// Rebuilds a timeline from a saved snapshot.
    ///
    /// The snapshot must pass [`validate_timeline`], except that tasks outside
    /// their phase are accepted: [`Timeline::edit_phase`] can leave them that
    /// way, and they show up in [`Timeline::warnings`]. Stored rates are kept
    /// as saved.
    pub fn restore(
        snapshot: TimelineSnapshot,
        registry: &CalendarRegistry,
        rate_card: RateCard,
    ) -> Result<Self, EngineError> {
        let calendar = registry.get(snapshot.region.as_str())?.clone();
        validate_timeline_with(
            &snapshot.phases,
            &snapshot.integrations,
            &calendar,
            snapshot.epoch,
            Containment::Report,
        )
        .map_err(|errors| rejected("restore", EngineError::from_rejections(errors)))?;

        let mut phases = snapshot.phases;
        phases.sort_by_key(|p| p.order);
        let timeline = Self {
            epoch: snapshot.epoch,
            calendar,
            rate_card,
            phases,
            overrides: snapshot.overrides,
            integrations: snapshot.integrations,
        };
        for w in timeline.warnings() {
            warn!(kind = ?w.kind, entity_id = %w.entity_id, "restored with: {}", w.message);
        }
        Ok(timeline)
    }

    /// Persistable copy of the current state.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            epoch: self.epoch,
            region: self.calendar.region.clone(),
            phases: self.phases.clone(),
            overrides: self.overrides.clone(),
            integrations: self.integrations.clone(),
        }
    }

    // ---- accessors ----

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn region(&self) -> &Region {
        &self.calendar.region
    }

    pub fn calendar(&self) -> &WorkingCalendar {
        &self.calendar
    }

    pub fn rate_card(&self) -> &RateCard {
        &self.rate_card
    }

    /// Phases in sequence order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, phase_id: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    pub fn overrides(&self) -> &[ManualOverride] {
        &self.overrides
    }

    pub fn integrations(&self) -> &[IntegrationRecord] {
        &self.integrations
    }

    /// Calendar span of a phase.
    pub fn phase_span(&self, phase_id: &str) -> Result<DateSpan, Rejection> {
        let phase = self.phase(phase_id).ok_or_else(|| Rejection::unknown_phase(phase_id))?;
        Ok(phase.span(&self.calendar, self.epoch))
    }

    pub fn phase_cost(&self, phase_id: &str) -> Result<f64, Rejection> {
        self.phase(phase_id)
            .map(phase_cost)
            .ok_or_else(|| Rejection::unknown_phase(phase_id))
    }

    pub fn project_cost(&self) -> f64 {
        project_cost(&self.phases)
    }

    pub fn effort_budget(&self, phase_id: &str) -> Result<EffortBudget, Rejection> {
        self.phase(phase_id)
            .map(EffortBudget::of)
            .ok_or_else(|| Rejection::unknown_phase(phase_id))
    }

    /// All advisory warnings for the current state.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for phase in &self.phases {
            warnings.extend(phase_warnings(phase));
            warnings.extend(
                tasks_out_of_bounds(phase, &self.calendar, self.epoch)
                    .into_iter()
                    .map(|task_id| Warning::task_outside_phase(task_id, &phase.id)),
            );
        }
        warnings
    }

    // ---- phases ----

    /// Adds a hand-made phase.
    pub fn add_phase(&mut self, phase: Phase) -> Result<MutationOutcome, EngineError> {
        if self.phase(&phase.id).is_some() {
            return Err(rejected(
                "add_phase",
                Rejection::new(
                    RejectionKind::DuplicateId,
                    format!("Phase '{}' already exists", phase.id),
                ),
            ));
        }
        let existing_tasks: HashSet<&str> = self.task_ids().collect();
        if let Some(dup) = phase.tasks.iter().find(|t| existing_tasks.contains(t.id.as_str())) {
            return Err(rejected("add_phase", duplicate_task(&dup.id)));
        }

        let (mut prepared, warnings) = self.prepare_phases(vec![phase])?;
        let phase = prepared.remove(0);
        let phase_id = phase.id.clone();
        let at = self
            .phases
            .iter()
            .position(|p| p.order > phase.order)
            .unwrap_or(self.phases.len());
        debug!(
            phase_id = %phase_id,
            start_business_day = phase.start_business_day(),
            working_days = phase.working_days(),
            "phase added"
        );
        self.phases.insert(at, phase);
        self.record(ManualOverride::phase(&phase_id, OverrideField::Created));

        let mut warnings = warnings;
        warnings.extend(self.phase(&phase_id).map(phase_warnings).unwrap_or_default());
        Ok(self.outcome(Some(&phase_id), warnings))
    }

    /// Changes a phase's start, end or duration.
    ///
    /// Existing tasks are never moved; tasks left outside the new span are
    /// returned as [`WarningKind::TaskOutsidePhase`](crate::models::WarningKind)
    /// warnings.
    pub fn edit_phase(
        &mut self,
        phase_id: &str,
        edit: PhaseEdit,
    ) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("edit_phase", r))?;
        let schedule = apply_phase_edit(&self.phases[idx], edit, &self.calendar, self.epoch)
            .map_err(|r| rejected("edit_phase", r))?;

        let phase = &mut self.phases[idx];
        phase.set_schedule(schedule.start_business_day, schedule.working_days);
        debug!(
            phase_id,
            start_business_day = schedule.start_business_day,
            working_days = schedule.working_days,
            "phase rescheduled"
        );

        let warnings: Vec<Warning> =
            tasks_out_of_bounds(&self.phases[idx], &self.calendar, self.epoch)
                .into_iter()
                .map(|task_id| Warning::task_outside_phase(task_id, phase_id))
                .collect();

        let field = match edit {
            PhaseEdit::StartDate(_) => OverrideField::StartDate,
            PhaseEdit::EndDate(_) => OverrideField::EndDate,
            PhaseEdit::WorkingDays(_) => OverrideField::WorkingDays,
        };
        self.record(ManualOverride::phase(phase_id, field));
        Ok(self.outcome(Some(phase_id), warnings))
    }

    pub fn rename_phase(
        &mut self,
        phase_id: &str,
        name: impl Into<String>,
    ) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("rename_phase", r))?;
        self.phases[idx].name = name.into();
        self.record(ManualOverride::phase(phase_id, OverrideField::Name));
        Ok(self.outcome(Some(phase_id), Vec::new()))
    }

    /// Sets a phase's authorized effort budget.
    pub fn set_phase_effort(
        &mut self,
        phase_id: &str,
        effort: f64,
    ) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("set_phase_effort", r))?;
        check_effort(effort).map_err(|r| rejected("set_phase_effort", r))?;
        self.phases[idx].effort = effort;
        self.record(ManualOverride::phase(phase_id, OverrideField::Effort));
        let warnings = budget_warning(&self.phases[idx]);
        Ok(self.outcome(Some(phase_id), warnings))
    }

    /// Deletes a phase with its tasks, resources, integration records and
    /// overrides.
    pub fn remove_phase(&mut self, phase_id: &str) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("remove_phase", r))?;
        let removed = self.phases.remove(idx);
        self.integrations.retain(|i| !i.references(phase_id));
        self.overrides.retain(|o| o.phase_id != phase_id);
        debug!(
            phase_id,
            tasks = removed.tasks.len(),
            resources = removed.resources.len(),
            "phase removed"
        );
        Ok(self.outcome(None, Vec::new()))
    }

    // ---- tasks ----

    /// Adds a task to a phase. The task must lie inside the phase.
    ///
    /// Exceeding the phase's effort budget is reported, never rejected.
    pub fn add_task(&mut self, phase_id: &str, task: Task) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("add_task", r))?;
        if self.task_ids().any(|id| id == task.id) {
            return Err(rejected("add_task", duplicate_task(&task.id)));
        }
        check_effort(task.effort).map_err(|r| rejected("add_task", r))?;
        check_new_task(&self.phases[idx], &task, &self.calendar, self.epoch)
            .map_err(|r| rejected("add_task", r))?;

        let task_id = task.id.clone();
        debug!(phase_id, task_id = %task_id, working_days = task.working_days(), "task added");
        self.phases[idx].tasks.push(task);
        self.record(ManualOverride::task(phase_id, &task_id, OverrideField::Created));

        let warnings = budget_warning(&self.phases[idx]);
        Ok(self.outcome(Some(phase_id), warnings))
    }

    /// Changes a task's dates or duration.
    ///
    /// Rejected when the result would leave the owning phase; the task then
    /// keeps its previous span.
    pub fn edit_task(
        &mut self,
        phase_id: &str,
        task_id: &str,
        edit: TaskEdit,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, tidx) = self.task_index(phase_id, task_id).map_err(|r| rejected("edit_task", r))?;
        let phase = &self.phases[idx];
        let edited = apply_task_edit(phase, &phase.tasks[tidx], edit, &self.calendar, self.epoch)
            .map_err(|r| rejected("edit_task", r))?;

        debug!(
            phase_id,
            task_id,
            working_days = edited.working_days(),
            "task rescheduled"
        );
        self.phases[idx].tasks[tidx] = edited;

        let fields: &[OverrideField] = match edit {
            TaskEdit::StartDate(_) => &[OverrideField::StartDate],
            TaskEdit::EndDate(_) => &[OverrideField::EndDate],
            TaskEdit::Dates { .. } => &[OverrideField::StartDate, OverrideField::EndDate],
            TaskEdit::WorkingDays(_) => &[OverrideField::WorkingDays],
        };
        for &field in fields {
            self.record(ManualOverride::task(phase_id, task_id, field));
        }
        Ok(self.outcome(Some(phase_id), Vec::new()))
    }

    /// Sets a task's planned effort. Never blocked by the phase budget.
    pub fn set_task_effort(
        &mut self,
        phase_id: &str,
        task_id: &str,
        effort: f64,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, tidx) = self
            .task_index(phase_id, task_id)
            .map_err(|r| rejected("set_task_effort", r))?;
        check_effort(effort).map_err(|r| rejected("set_task_effort", r))?;
        self.phases[idx].tasks[tidx].effort = effort;
        self.record(ManualOverride::task(phase_id, task_id, OverrideField::Effort));
        let warnings = budget_warning(&self.phases[idx]);
        Ok(self.outcome(Some(phase_id), warnings))
    }

    /// Sets a task's status. Any transition is allowed.
    pub fn set_task_status(
        &mut self,
        phase_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, tidx) = self
            .task_index(phase_id, task_id)
            .map_err(|r| rejected("set_task_status", r))?;
        self.phases[idx].tasks[tidx].status = status;
        self.record(ManualOverride::task(phase_id, task_id, OverrideField::Status));
        Ok(self.outcome(Some(phase_id), Vec::new()))
    }

    pub fn remove_task(
        &mut self,
        phase_id: &str,
        task_id: &str,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, tidx) = self
            .task_index(phase_id, task_id)
            .map_err(|r| rejected("remove_task", r))?;
        self.phases[idx].tasks.remove(tidx);
        self.overrides
            .retain(|o| !(o.phase_id == phase_id && o.task_id.as_deref() == Some(task_id)));
        self.record(ManualOverride::phase(phase_id, OverrideField::Tasks));
        debug!(phase_id, task_id, "task removed");
        Ok(self.outcome(Some(phase_id), Vec::new()))
    }

    // ---- resources ----

    /// Staffs a resource onto a phase.
    ///
    /// A resource without a manual rate gets the rate card's suggestion.
    /// Allocation above 100% is accepted with a warning.
    pub fn add_resource(
        &mut self,
        phase_id: &str,
        resource: Resource,
    ) -> Result<MutationOutcome, EngineError> {
        let idx = self.phase_index(phase_id).map_err(|r| rejected("add_resource", r))?;
        if self.phases[idx].resource(&resource.id).is_some() {
            return Err(rejected(
                "add_resource",
                Rejection::new(
                    RejectionKind::DuplicateId,
                    format!("Resource '{}' already exists in phase '{phase_id}'", resource.id),
                ),
            ));
        }

        let mut resource = resource;
        let mut warnings = self
            .prepare_resource(&mut resource)
            .map_err(|r| rejected("add_resource", r))?;
        debug!(
            phase_id,
            resource_id = %resource.id,
            allocation = resource.allocation,
            hourly_rate = resource.hourly_rate,
            "resource added"
        );
        warnings.extend(allocation_warning(&resource));
        self.phases[idx].resources.push(resource);
        self.record(ManualOverride::phase(phase_id, OverrideField::Resources));
        Ok(self.outcome(Some(phase_id), warnings))
    }

    /// Changes resource fields.
    ///
    /// A changed role or region refreshes a suggested rate; a manual rate is
    /// kept until replaced by `hourly_rate` or [`Timeline::apply_suggested_rate`].
    pub fn edit_resource(
        &mut self,
        phase_id: &str,
        resource_id: &str,
        edit: ResourceEdit,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, ridx) = self
            .resource_index(phase_id, resource_id)
            .map_err(|r| rejected("edit_resource", r))?;

        let mut resource = self.phases[idx].resources[ridx].clone();
        if let Some(name) = edit.name {
            resource.name = name;
        }
        if let Some(role) = edit.role {
            resource.role = role;
        }
        if let Some(region) = edit.region {
            resource.region = region;
        }
        if let Some(allocation) = edit.allocation {
            resource.allocation = allocation;
        }
        if let Some(rate) = edit.hourly_rate {
            resource.hourly_rate = rate;
            resource.rate_source = RateSource::Manual;
        }

        let mut warnings = self
            .prepare_resource(&mut resource)
            .map_err(|r| rejected("edit_resource", r))?;
        warnings.extend(allocation_warning(&resource));
        debug!(
            phase_id,
            resource_id,
            allocation = resource.allocation,
            hourly_rate = resource.hourly_rate,
            "resource edited"
        );
        self.phases[idx].resources[ridx] = resource;
        self.record(ManualOverride::phase(phase_id, OverrideField::Resources));
        Ok(self.outcome(Some(phase_id), warnings))
    }

    /// Replaces a resource's rate with the rate card suggestion.
    ///
    /// This is the only operation that overwrites a manual rate.
    pub fn apply_suggested_rate(
        &mut self,
        phase_id: &str,
        resource_id: &str,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, ridx) = self
            .resource_index(phase_id, resource_id)
            .map_err(|r| rejected("apply_suggested_rate", r))?;

        let resource = &mut self.phases[idx].resources[ridx];
        resource.rate_source = RateSource::Suggested;
        let mut warnings = Vec::new();
        if let Some(suggestion) = self.rate_card.fill_rate(resource) {
            if suggestion.is_fallback {
                warnings.push(Warning::fallback_rate_used(resource_id, suggestion.rate));
            }
        }
        self.record(ManualOverride::phase(phase_id, OverrideField::Resources));
        Ok(self.outcome(Some(phase_id), warnings))
    }

    pub fn remove_resource(
        &mut self,
        phase_id: &str,
        resource_id: &str,
    ) -> Result<MutationOutcome, EngineError> {
        let (idx, ridx) = self
            .resource_index(phase_id, resource_id)
            .map_err(|r| rejected("remove_resource", r))?;
        self.phases[idx].resources.remove(ridx);
        self.record(ManualOverride::phase(phase_id, OverrideField::Resources));
        debug!(phase_id, resource_id, "resource removed");
        Ok(self.outcome(Some(phase_id), Vec::new()))
    }

    // ---- integrations ----

    /// Links two existing phases.
    pub fn add_integration(&mut self, record: IntegrationRecord) -> Result<(), EngineError> {
        for end in [&record.from_phase, &record.to_phase] {
            self.phase_index(end).map_err(|r| rejected("add_integration", r))?;
        }
        if self.integrations.iter().any(|i| i.id == record.id) {
            return Err(rejected(
                "add_integration",
                Rejection::new(
                    RejectionKind::DuplicateId,
                    format!("Integration '{}' already exists", record.id),
                ),
            ));
        }
        self.integrations.push(record);
        Ok(())
    }

    /// Removes an integration record. Returns whether it existed.
    pub fn remove_integration(&mut self, integration_id: &str) -> bool {
        let before = self.integrations.len();
        self.integrations.retain(|i| i.id != integration_id);
        self.integrations.len() != before
    }

    // ---- regeneration ----

    /// Diff between this timeline and a regenerated candidate.
    ///
    /// Read-only. Candidate resources without a manual rate are costed at
    /// their suggested rate.
    pub fn diff_against(&self, candidate: &[Phase]) -> RegenerateDiff {
        let diff = self.regeneration_diff(candidate);
        if diff.has_manual_edits_at_risk() {
            warn!(
                manual_edits = diff.manual_edits_count,
                affected = ?diff.affected_phase_names,
                "regeneration would discard manual edits"
            );
        }
        diff
    }

    /// Replaces all phases with a confirmed regeneration.
    ///
    /// Manual overrides are discarded; integration records survive only if
    /// both of their phase ids still exist.
    ///
    /// Rejected with `StaleConfirmation` when the timeline no longer yields
    /// the confirmed diff, for example after an edit made since the diff was
    /// shown.
    pub fn apply_regeneration(
        &mut self,
        confirmed: ConfirmedRegeneration,
    ) -> Result<MutationOutcome, EngineError> {
        let current = self.regeneration_diff(confirmed.phases());
        if !confirmed.diff().matches(&current) {
            return Err(rejected(
                "apply_regeneration",
                Rejection::new(
                    RejectionKind::StaleConfirmation,
                    format!(
                        "The timeline changed since the regeneration diff was confirmed \
                         ({} manual edits now at risk); review a new diff",
                        current.manual_edits_count
                    ),
                ),
            ));
        }
        let (diff, phases) = confirmed.into_parts();
        let (phases, mut warnings) = self.prepare_phases(phases)?;

        let ids: HashSet<&str> = phases.iter().map(|p| p.id.as_str()).collect();
        let integrations: Vec<IntegrationRecord> = self
            .integrations
            .iter()
            .filter(|i| ids.contains(i.from_phase.as_str()) && ids.contains(i.to_phase.as_str()))
            .cloned()
            .collect();

        info!(
            phases_added = diff.phases_added,
            phases_removed = diff.phases_removed,
            duration_change_days = diff.duration_change_days,
            cost_change = diff.cost_change,
            discarded_overrides = self.overrides.len(),
            "regeneration applied"
        );
        self.phases = phases;
        self.integrations = integrations;
        self.overrides.clear();

        warnings.extend(self.warnings());
        Ok(self.outcome(None, warnings))
    }

    // ---- internals ----

    fn phase_index(&self, phase_id: &str) -> Result<usize, Rejection> {
        self.phases
            .iter()
            .position(|p| p.id == phase_id)
            .ok_or_else(|| Rejection::unknown_phase(phase_id))
    }

    fn task_index(&self, phase_id: &str, task_id: &str) -> Result<(usize, usize), Rejection> {
        let idx = self.phase_index(phase_id)?;
        let tidx = self.phases[idx]
            .task_index(task_id)
            .ok_or_else(|| Rejection::unknown_task(phase_id, task_id))?;
        Ok((idx, tidx))
    }

    fn resource_index(
        &self,
        phase_id: &str,
        resource_id: &str,
    ) -> Result<(usize, usize), Rejection> {
        let idx = self.phase_index(phase_id)?;
        let ridx = self.phases[idx]
            .resource_index(resource_id)
            .ok_or_else(|| Rejection::unknown_resource(phase_id, resource_id))?;
        Ok((idx, ridx))
    }

    fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .flat_map(|p| p.tasks.iter().map(|t| t.id.as_str()))
    }

    /// Diff against `candidate`, costing its resources at suggested rates.
    fn regeneration_diff(&self, candidate: &[Phase]) -> RegenerateDiff {
        let mut costed = candidate.to_vec();
        for resource in costed.iter_mut().flat_map(|p| p.resources.iter_mut()) {
            self.rate_card.fill_rate(resource);
        }
        RegenerateDiff::compute(
            &self.phases,
            &costed,
            &self.overrides,
            self.project_cost(),
            project_cost(&costed),
        )
    }

    /// Fills suggested rates, sorts by order and validates a phase set.
    fn prepare_phases(
        &self,
        mut phases: Vec<Phase>,
    ) -> Result<(Vec<Phase>, Vec<Warning>), EngineError> {
        let mut warnings = Vec::new();
        for resource in phases.iter_mut().flat_map(|p| p.resources.iter_mut()) {
            if let Some(suggestion) = self.rate_card.fill_rate(resource) {
                if suggestion.is_fallback {
                    warnings.push(Warning::fallback_rate_used(&resource.id, suggestion.rate));
                }
            }
        }
        phases.sort_by_key(|p| p.order);
        validate_timeline(&phases, &[], &self.calendar, self.epoch)
            .map_err(|errors| rejected("prepare_phases", EngineError::from_rejections(errors)))?;
        Ok((phases, warnings))
    }

    /// Validates a resource and fills a suggested rate.
    fn prepare_resource(&self, resource: &mut Resource) -> Result<Vec<Warning>, Rejection> {
        check_allocation(resource.allocation)?;
        let mut warnings = Vec::new();
        if let Some(suggestion) = self.rate_card.fill_rate(resource) {
            if suggestion.is_fallback {
                warnings.push(Warning::fallback_rate_used(&resource.id, suggestion.rate));
            }
        }
        check_rate(resource.hourly_rate)?;
        Ok(warnings)
    }

    fn record(&mut self, entry: ManualOverride) {
        if !self.overrides.contains(&entry) {
            self.overrides.push(entry);
        }
    }

    fn outcome(&self, phase_id: Option<&str>, warnings: Vec<Warning>) -> MutationOutcome {
        for w in &warnings {
            warn!(kind = ?w.kind, entity_id = %w.entity_id, "{}", w.message);
        }
        MutationOutcome {
            warnings,
            phase_cost: phase_id.and_then(|id| self.phase(id)).map(phase_cost),
            project_cost: self.project_cost(),
        }
    }
}

/// Budget and allocation warnings for one phase.
fn phase_warnings(phase: &Phase) -> Vec<Warning> {
    let mut warnings = budget_warning(phase);
    warnings.extend(phase.resources.iter().filter_map(allocation_warning));
    warnings
}

fn budget_warning(phase: &Phase) -> Vec<Warning> {
    EffortBudget::of(phase).warning().into_iter().collect()
}

fn allocation_warning(resource: &Resource) -> Option<Warning> {
    resource
        .is_over_allocated()
        .then(|| Warning::resource_over_allocated(&resource.id, resource.allocation))
}

fn duplicate_task(task_id: &str) -> Rejection {
    Rejection::new(
        RejectionKind::DuplicateId,
        format!("Task '{task_id}' already exists in the timeline"),
    )
}

/// Logs a refused operation and converts it.
fn rejected(op: &'static str, err: impl Into<EngineError>) -> EngineError {
    let err = err.into();
    debug!(op, kind = ?err.rejection_kind(), error = %err, "operation rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WarningKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn registry() -> CalendarRegistry {
        let mut reg = CalendarRegistry::new();
        reg.insert(WorkingCalendar::new("XX"));
        reg
    }

    /// P1 spans Jan 6..Jan 20, P2 spans Jan 20..Feb 3 (weekends only).
    fn timeline() -> Timeline {
        let mut tl = Timeline::new(d(2025, 1, 6), "XX", &registry()).unwrap();
        let cal = tl.calendar().clone();
        tl.install_generated(vec![
            Phase::new("P2", "Explore").with_order(2).with_schedule(10, 10),
            Phase::new("P1", "Prepare")
                .with_order(1)
                .with_schedule(0, 10)
                .with_effort(10.0)
                .with_task(
                    Task::with_duration("T1", "Kickoff", d(2025, 1, 6), 5, &cal)
                        .unwrap()
                        .with_effort(4.0),
                ),
        ])
        .unwrap();
        tl
    }

    #[test]
    fn test_unknown_region() {
        let err = Timeline::new(d(2025, 1, 6), "ZZ", &registry()).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownRegion(_)));
    }

    #[test]
    fn test_install_sorts_and_clears_overrides() {
        let tl = timeline();
        let ids: Vec<&str> = tl.phases().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert!(tl.overrides().is_empty());
        assert_eq!(tl.phase_span("P2").unwrap().start, d(2025, 1, 20));
    }

    #[test]
    fn test_add_resource_costs_phase() {
        let mut tl = timeline();
        let out = tl.add_resource("P1", Resource::new("R1", Role::Consultant, "MY")).unwrap();
        // Suggested 180 × 8h × 10 days
        assert_eq!(out.phase_cost, Some(14_400.0));
        assert!((out.project_cost - 14_400.0).abs() < 1e-9);
        assert!(out.warnings.is_empty());
        assert_eq!(tl.overrides(), &[ManualOverride::phase("P1", OverrideField::Resources)]);
    }

    #[test]
    fn test_allocation_range() {
        let mut tl = timeline();
        let out = tl
            .add_resource("P1", Resource::new("R1", Role::Lead, "MY").with_allocation(150.0))
            .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::ResourceOverAllocated);

        let err = tl
            .add_resource("P1", Resource::new("R2", Role::Lead, "MY").with_allocation(250.0))
            .unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::AllocationOutOfRange));
        assert_eq!(tl.phase("P1").unwrap().resources.len(), 1);
    }

    #[test]
    fn test_fallback_rate_warning() {
        let mut tl = timeline();
        let out = tl
            .add_resource("P1", Resource::new("R1", Role::Custom("Trainer".into()), "MY"))
            .unwrap();
        assert_eq!(out.warnings[0].kind, WarningKind::FallbackRateUsed);
        assert_eq!(tl.phase("P1").unwrap().resources[0].hourly_rate, 150.0);
    }

    #[test]
    fn test_edit_resource_rates() {
        let mut tl = timeline();
        tl.add_resource("P1", Resource::new("R1", Role::Developer, "MY")).unwrap();

        // Suggested rate follows the role
        tl.edit_resource(
            "P1",
            "R1",
            ResourceEdit {
                role: Some(Role::Architect),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(tl.phase("P1").unwrap().resources[0].hourly_rate, 200.0);

        // Manual rate survives later role or region changes
        tl.edit_resource(
            "P1",
            "R1",
            ResourceEdit {
                hourly_rate: Some(95.0),
                ..Default::default()
            },
        )
        .unwrap();
        tl.edit_resource(
            "P1",
            "R1",
            ResourceEdit {
                region: Some(Region::singapore()),
                ..Default::default()
            },
        )
        .unwrap();
        let r = &tl.phase("P1").unwrap().resources[0];
        assert_eq!(r.hourly_rate, 95.0);
        assert_eq!(r.rate_source, RateSource::Manual);

        // Only the explicit action replaces it
        tl.apply_suggested_rate("P1", "R1").unwrap();
        let r = &tl.phase("P1").unwrap().resources[0];
        assert!((r.hourly_rate - 270.0).abs() < 1e-9);
        assert_eq!(r.rate_source, RateSource::Suggested);
    }

    #[test]
    fn test_add_task_containment() {
        let mut tl = timeline();
        let cal = tl.calendar().clone();
        let late = Task::with_duration("T2", "Late", d(2025, 1, 15), 5, &cal).unwrap();
        let err = tl.add_task("P1", late).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::OutsidePhase));
        assert_eq!(tl.phase("P1").unwrap().task_count(), 1);
        assert!(tl.overrides().is_empty());

        let fits = Task::with_duration("T2", "Fits", d(2025, 1, 13), 5, &cal).unwrap();
        tl.add_task("P1", fits).unwrap();
        assert_eq!(tl.phase("P1").unwrap().task_count(), 2);
    }

    #[test]
    fn test_duplicate_task_across_phases() {
        let mut tl = timeline();
        let cal = tl.calendar().clone();
        let dup = Task::with_duration("T1", "Again", d(2025, 1, 21), 2, &cal).unwrap();
        let err = tl.add_task("P2", dup).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::DuplicateId));
    }

    #[test]
    fn test_edit_task_rejected_keeps_span() {
        let mut tl = timeline();
        let before = tl.phase("P1").unwrap().task("T1").unwrap().clone();

        let err = tl.edit_task("P1", "T1", TaskEdit::WorkingDays(15)).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::OutsidePhase));
        assert_eq!(tl.phase("P1").unwrap().task("T1").unwrap(), &before);
        assert!(tl.overrides().is_empty());
    }

    #[test]
    fn test_edit_task_records_overrides() {
        let mut tl = timeline();
        tl.edit_task(
            "P1",
            "T1",
            TaskEdit::Dates {
                start: d(2025, 1, 7),
                end: d(2025, 1, 9),
            },
        )
        .unwrap();
        let t = tl.phase("P1").unwrap().task("T1").unwrap();
        assert_eq!(t.working_days(), 2);
        assert_eq!(tl.overrides().len(), 2);

        // Same fields again do not duplicate overrides
        tl.edit_task("P1", "T1", TaskEdit::EndDate(d(2025, 1, 10))).unwrap();
        assert_eq!(tl.overrides().len(), 2);
    }

    #[test]
    fn test_shrinking_phase_warns() {
        let mut tl = timeline();
        let out = tl.edit_phase("P1", PhaseEdit::WorkingDays(3)).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::TaskOutsidePhase);
        // Task is not moved
        assert_eq!(
            tl.phase("P1").unwrap().task("T1").unwrap().end_date(),
            d(2025, 1, 13)
        );
        assert_eq!(tl.phase("P1").unwrap().working_days(), 3);
    }

    #[test]
    fn test_phase_start_snaps_forward() {
        let mut tl = timeline();
        // Saturday Jan 25 snaps to Monday Jan 27
        tl.edit_phase("P2", PhaseEdit::StartDate(d(2025, 1, 25))).unwrap();
        assert_eq!(tl.phase_span("P2").unwrap().start, d(2025, 1, 27));
        assert_eq!(tl.phase("P2").unwrap().working_days(), 10);
    }

    #[test]
    fn test_negative_phase_duration_rejected() {
        let mut tl = timeline();
        let err = tl.edit_phase("P1", PhaseEdit::WorkingDays(-1)).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::NegativeDuration));
        assert_eq!(tl.phase("P1").unwrap().working_days(), 10);
    }

    #[test]
    fn test_effort_over_budget_is_warning() {
        let mut tl = timeline();
        let out = tl.set_task_effort("P1", "T1", 12.0).unwrap();
        assert_eq!(out.warnings[0].kind, WarningKind::EffortOverAllocated);
        let budget = tl.effort_budget("P1").unwrap();
        assert!((budget.remaining - -2.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_phase_cascades() {
        let mut tl = timeline();
        tl.add_integration(IntegrationRecord::new("I1", "P1", "P2")).unwrap();
        tl.rename_phase("P1", "Prepare+").unwrap();
        tl.rename_phase("P2", "Explore+").unwrap();

        tl.remove_phase("P1").unwrap();
        assert!(tl.phase("P1").is_none());
        assert!(tl.integrations().is_empty());
        assert!(tl.overrides().iter().all(|o| o.phase_id == "P2"));

        let err = tl.remove_phase("P1").unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::UnknownPhase));
    }

    #[test]
    fn test_integration_requires_phases() {
        let mut tl = timeline();
        let err = tl.add_integration(IntegrationRecord::new("I1", "P1", "P9")).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::UnknownPhase));
        tl.add_integration(IntegrationRecord::new("I1", "P1", "P2")).unwrap();
        assert!(tl.remove_integration("I1"));
        assert!(!tl.remove_integration("I1"));
    }

    #[test]
    fn test_regeneration_flow() {
        let mut tl = timeline();
        tl.add_integration(IntegrationRecord::new("I1", "P1", "P2")).unwrap();
        tl.set_task_status("P1", "T1", TaskStatus::InProgress).unwrap();

        let candidate = vec![
            Phase::new("P1", "Prepare").with_schedule(0, 5),
            Phase::new("P3", "Realize")
                .with_schedule(5, 15)
                .with_resource(Resource::new("R1", Role::Tester, "MY")),
        ];
        let diff = tl.diff_against(&candidate);
        assert_eq!(diff.manual_edits_count, 1);
        assert_eq!(diff.affected_phase_names, vec!["Prepare"]);
        assert_eq!(diff.duration_change_days, 0);
        // Tester 100 × 8h × 15 days
        assert!((diff.cost_change - 12_000.0).abs() < 1e-9);
        // Read-only
        assert_eq!(tl.phases().len(), 2);

        tl.apply_regeneration(diff.confirm(candidate)).unwrap();
        assert!(tl.overrides().is_empty());
        assert!(tl.integrations().is_empty());
        assert!((tl.project_cost() - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_regeneration_keeps_state() {
        let mut tl = timeline();
        let candidate = vec![
            Phase::new("A", "A").with_schedule(0, -1),
            Phase::new("A", "B").with_schedule(0, 1),
        ];
        let diff = tl.diff_against(&candidate);
        let err = tl.apply_regeneration(diff.confirm(candidate)).unwrap_err();
        assert!(matches!(err, EngineError::Invalid(ref v) if v.len() == 2));
        assert_eq!(tl.phases().len(), 2);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut tl = timeline();
        tl.add_resource("P2", Resource::new("R1", Role::Lead, "SG").with_hourly_rate(200.0))
            .unwrap();
        tl.add_integration(IntegrationRecord::new("I1", "P1", "P2")).unwrap();

        let json = serde_json::to_string(&tl.snapshot()).unwrap();
        let snapshot: TimelineSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Timeline::restore(snapshot, &registry(), RateCard::default()).unwrap();
        assert_eq!(restored.phases(), tl.phases());
        assert_eq!(restored.overrides(), tl.overrides());
        assert!((restored.project_cost() - tl.project_cost()).abs() < 1e-9);
    }

    #[test]
    fn test_restore_accepts_tasks_left_outside_shrunk_phase() {
        let mut tl = timeline();
        tl.edit_phase("P1", PhaseEdit::WorkingDays(3)).unwrap();

        let json = serde_json::to_string(&tl.snapshot()).unwrap();
        let snapshot: TimelineSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Timeline::restore(snapshot, &registry(), RateCard::default()).unwrap();

        assert_eq!(restored.phases(), tl.phases());
        let warnings = restored.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::TaskOutsidePhase);
        assert_eq!(warnings[0].entity_id, "T1");

        // New phase sets stay strict
        let mut fresh = Timeline::new(d(2025, 1, 6), "XX", &registry()).unwrap();
        let err = fresh.install_generated(restored.phases().to_vec()).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::OutsidePhase));
    }

    #[test]
    fn test_stale_confirmation_rejected() {
        let mut tl = timeline();
        let candidate = vec![Phase::new("P9", "Replan").with_schedule(0, 20)];
        let diff = tl.diff_against(&candidate);
        assert_eq!(diff.manual_edits_count, 0);
        let confirmed = diff.confirm(candidate.clone());

        tl.rename_phase("P1", "Prepare (edited)").unwrap();
        let err = tl.apply_regeneration(confirmed).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::StaleConfirmation));
        assert_eq!(tl.phases().len(), 2);
        assert_eq!(tl.overrides().len(), 1);

        // A cost change after confirming is stale too
        let confirmed = tl.diff_against(&candidate).confirm(candidate.clone());
        tl.add_resource("P2", Resource::new("R1", Role::Tester, "MY")).unwrap();
        let err = tl.apply_regeneration(confirmed).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::StaleConfirmation));

        // A fresh diff applies
        let confirmed = tl.diff_against(&candidate).confirm(candidate);
        tl.apply_regeneration(confirmed).unwrap();
        assert_eq!(tl.phases().len(), 1);
        assert!(tl.overrides().is_empty());
    }

    #[test]
    fn test_restore_rejects_bad_snapshot() {
        let mut snapshot = timeline().snapshot();
        snapshot.integrations.push(IntegrationRecord::new("I9", "P1", "P7"));
        let err =
            Timeline::restore(snapshot.clone(), &registry(), RateCard::default()).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::UnknownPhase));

        snapshot.region = Region::new("QQ");
        let err = Timeline::restore(snapshot, &registry(), RateCard::default()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
