//! Timeline summary indicators.
//!
//! Headline figures for a timeline, computed on demand from its phases.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total working days | Sum of phase `working_days` |
//! | Project start | Earliest phase start date |
//! | Project end | Latest phase end date |
//! | Total cost | Sum of phase costs |
//! | Authorized effort | Sum of phase effort budgets (person-days) |
//! | Allocated effort | Sum of task effort (person-days) |
//! | Over-allocated phases | Phases whose tasks exceed their budget |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WorkingCalendar;
use crate::costing::phase_cost;
use crate::effort::EffortBudget;
use crate::models::{Phase, TaskStatus};
use crate::timeline::Timeline;

/// Cost and duration of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub working_days: i64,
    pub cost: f64,
}

/// Headline indicators of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    /// Sum of phase working days. Overlapping phases count twice.
    pub total_working_days: i64,
    /// Earliest phase start, `None` without phases.
    pub start_date: Option<NaiveDate>,
    /// Latest phase end, `None` without phases.
    pub end_date: Option<NaiveDate>,
    pub total_cost: f64,
    /// Per-phase figures in timeline order.
    pub phases: Vec<PhaseSummary>,
    pub authorized_effort: f64,
    pub allocated_effort: f64,
    /// Ids of phases whose task effort exceeds their budget.
    pub over_allocated_phases: Vec<String>,
    /// Fraction of tasks marked completed (0.0..=1.0); 0 without tasks.
    pub completion_rate: f64,
}

impl TimelineSummary {
    /// Computes the summary of a phase set.
    pub fn calculate(phases: &[Phase], calendar: &WorkingCalendar, epoch: NaiveDate) -> Self {
        let mut per_phase = Vec::with_capacity(phases.len());
        let mut authorized_effort = 0.0;
        let mut allocated_effort = 0.0;
        let mut over_allocated_phases = Vec::new();
        let mut task_count = 0usize;
        let mut completed = 0usize;

        for phase in phases {
            let span = phase.span(calendar, epoch);
            per_phase.push(PhaseSummary {
                phase_id: phase.id.clone(),
                name: phase.name.clone(),
                start_date: span.start,
                end_date: span.end,
                working_days: phase.working_days(),
                cost: phase_cost(phase),
            });

            let budget = EffortBudget::of(phase);
            authorized_effort += budget.authorized;
            allocated_effort += budget.allocated;
            if budget.is_over_allocated() {
                over_allocated_phases.push(phase.id.clone());
            }

            task_count += phase.tasks.len();
            completed += phase
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count();
        }

        let completion_rate = if task_count == 0 {
            0.0
        } else {
            completed as f64 / task_count as f64
        };

        Self {
            total_working_days: per_phase.iter().map(|p| p.working_days).sum(),
            start_date: per_phase.iter().map(|p| p.start_date).min(),
            end_date: per_phase.iter().map(|p| p.end_date).max(),
            total_cost: per_phase.iter().map(|p| p.cost).sum(),
            phases: per_phase,
            authorized_effort,
            allocated_effort,
            over_allocated_phases,
            completion_rate,
        }
    }

    /// Summary of a timeline's current state.
    pub fn of(timeline: &Timeline) -> Self {
        Self::calculate(timeline.phases(), timeline.calendar(), timeline.epoch())
    }

    /// Whether total cost stays within `max_cost` and no phase is over-committed.
    pub fn within_budget(&self, max_cost: f64) -> bool {
        self.total_cost <= max_cost && self.over_allocated_phases.is_empty()
    }
}
