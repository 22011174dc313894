//! Effort budget tracking.
//!
//! Compares a phase's authorized effort (person-days) with the sum of its
//! tasks' effort. Over-commitment is a warning state only: it never blocks
//! creating or editing tasks.

use serde::{Deserialize, Serialize};

use crate::models::{Phase, Warning};

/// Sum of task effort in the phase.
pub fn allocated_effort(phase: &Phase) -> f64 {
    phase.tasks.iter().map(|t| t.effort).sum()
}

/// Authorized minus allocated effort. Negative when over-committed.
pub fn remaining_effort(phase: &Phase) -> f64 {
    phase.effort - allocated_effort(phase)
}

/// Budget position of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Allocated effort is below the budget.
    Within { remaining: f64 },
    /// Allocated effort equals the budget.
    FullyAllocated,
    /// Allocated effort exceeds the budget.
    OverAllocated { by: f64 },
}

/// Effort snapshot of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortBudget {
    pub phase_id: String,
    /// Authorized person-days.
    pub authorized: f64,
    /// Sum of task person-days.
    pub allocated: f64,
    /// `authorized - allocated`.
    pub remaining: f64,
}

impl EffortBudget {
    /// Tolerance for treating the budget as exactly consumed.
    const EPSILON: f64 = 1e-9;

    /// Computes the budget of a phase.
    pub fn of(phase: &Phase) -> Self {
        let allocated = allocated_effort(phase);
        Self {
            phase_id: phase.id.clone(),
            authorized: phase.effort,
            allocated,
            remaining: phase.effort - allocated,
        }
    }

    pub fn status(&self) -> BudgetStatus {
        if self.remaining.abs() < Self::EPSILON {
            BudgetStatus::FullyAllocated
        } else if self.remaining > 0.0 {
            BudgetStatus::Within {
                remaining: self.remaining,
            }
        } else {
            BudgetStatus::OverAllocated {
                by: -self.remaining,
            }
        }
    }

    pub fn is_over_allocated(&self) -> bool {
        matches!(self.status(), BudgetStatus::OverAllocated { .. })
    }

    /// Warning for an over-committed budget, if any.
    pub fn warning(&self) -> Option<Warning> {
        match self.status() {
            BudgetStatus::OverAllocated { by } => {
                Some(Warning::effort_over_allocated(self.phase_id.clone(), by))
            }
            _ => None,
        }
    }

    /// Fraction of the budget consumed. `None` for a zero budget.
    pub fn utilization(&self) -> Option<f64> {
        if self.authorized <= 0.0 {
            return None;
        }
        Some(self.allocated / self.authorized)
    }
}
