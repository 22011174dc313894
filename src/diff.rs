//! Regeneration diff.
//!
//! Before a regenerated timeline replaces the current one, the user is shown
//! a [`RegenerateDiff`]: structural and financial deltas plus the manual
//! edits that would be discarded.
//!
//! # Phase Counts
//! The generator does not keep phase ids stable across regenerations, so
//! added/removed phases are counted by list length only:
//!
//! ```text
//! phases_added   = max(0, len(new) - len(current))
//! phases_removed = max(0, len(current) - len(new))
//! ```
//!
//! This is an approximation. Replacing one phase with a different one
//! reports zero added and zero removed. At most one of the two counts is
//! ever positive.
//!
//! Computing a diff is read-only. Applying it is a separate step that needs
//! a [`ConfirmedRegeneration`], obtained only by calling
//! [`RegenerateDiff::confirm`]. A confirmation is only honoured while the
//! timeline still produces the same diff; see [`RegenerateDiff::matches`].

use serde::{Deserialize, Serialize};

use crate::models::{ManualOverride, Phase, Warning};

/// Cost deltas closer than this are equal.
const COST_EPSILON: f64 = 1e-9;

/// Delta between a current timeline and a regenerated candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerateDiff {
    pub phases_added: usize,
    pub phases_removed: usize,
    /// `sum(new.working_days) - sum(current.working_days)`.
    pub duration_change_days: i64,
    /// `new_cost - current_cost`.
    pub cost_change: f64,
    /// Number of manual overrides on the current timeline.
    pub manual_edits_count: usize,
    /// Current phases with at least one override, in current phase order.
    pub affected_phase_names: Vec<String>,
}

impl RegenerateDiff {
    /// Computes the diff.
    ///
    /// `current_cost` and `new_cost` are the project costs of the two phase
    /// sets (see [`project_cost`](crate::costing::project_cost)). Overrides
    /// whose phase id is not in `current` are counted but name no phase.
    pub fn compute(
        current: &[Phase],
        new: &[Phase],
        overrides: &[ManualOverride],
        current_cost: f64,
        new_cost: f64,
    ) -> Self {
        let affected_phase_names = current
            .iter()
            .filter(|p| overrides.iter().any(|o| o.phase_id == p.id))
            .map(|p| p.name.clone())
            .collect();

        Self {
            phases_added: new.len().saturating_sub(current.len()),
            phases_removed: current.len().saturating_sub(new.len()),
            duration_change_days: total_working_days(new) - total_working_days(current),
            cost_change: new_cost - current_cost,
            manual_edits_count: overrides.len(),
            affected_phase_names,
        }
    }

    /// Whether applying would discard manual edits.
    pub fn has_manual_edits_at_risk(&self) -> bool {
        self.manual_edits_count > 0
    }

    /// Advisory warnings for the user.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if self.has_manual_edits_at_risk() {
            warnings.push(Warning::manual_edits_at_risk(
                self.manual_edits_count,
                &self.affected_phase_names,
            ));
        }
        warnings
    }

    /// Whether the candidate is structurally and financially identical.
    pub fn is_noop(&self) -> bool {
        self.phases_added == 0
            && self.phases_removed == 0
            && self.duration_change_days == 0
            && self.cost_change.abs() < COST_EPSILON
    }

    /// Whether two diffs describe the same change, comparing cost within
    /// rounding tolerance.
    pub fn matches(&self, other: &RegenerateDiff) -> bool {
        self.phases_added == other.phases_added
            && self.phases_removed == other.phases_removed
            && self.duration_change_days == other.duration_change_days
            && (self.cost_change - other.cost_change).abs() < COST_EPSILON
            && self.manual_edits_count == other.manual_edits_count
            && self.affected_phase_names == other.affected_phase_names
    }

    /// Records the user's confirmation, binding the diff to the candidate
    /// phases it was computed for.
    pub fn confirm(self, new_phases: Vec<Phase>) -> ConfirmedRegeneration {
        ConfirmedRegeneration {
            diff: self,
            phases: new_phases,
        }
    }
}

/// A diff the user accepted, together with the phases to install.
#[derive(Debug, Clone)]
pub struct ConfirmedRegeneration {
    diff: RegenerateDiff,
    phases: Vec<Phase>,
}

impl ConfirmedRegeneration {
    pub fn diff(&self) -> &RegenerateDiff {
        &self.diff
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub(crate) fn into_parts(self) -> (RegenerateDiff, Vec<Phase>) {
        (self.diff, self.phases)
    }
}

fn total_working_days(phases: &[Phase]) -> i64 {
    phases.iter().map(Phase::working_days).sum()
}
