//! Advisory warnings.
//!
//! Warnings describe planning risks that never block an operation:
//! over-committed effort budgets, allocation above 100%, tasks left outside
//! a resized phase, fallback rates, manual edits a regeneration would
//! discard.

use serde::{Deserialize, Serialize};

/// Classification of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Task effort exceeds the phase's authorized effort.
    EffortOverAllocated,
    /// Resource allocation above 100%.
    ResourceOverAllocated,
    /// Task no longer fits its phase after a phase edit.
    TaskOutsidePhase,
    /// Regeneration would discard manual edits.
    ManualEditsAtRisk,
    /// Rate card had no entry; the fallback rate was used.
    FallbackRateUsed,
}

/// An advisory warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Warning category.
    pub kind: WarningKind,
    /// Related entity id (phase, task or resource).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

impl Warning {
    /// Phase effort over-committed by `excess` person-days.
    pub fn effort_over_allocated(phase_id: impl Into<String>, excess: f64) -> Self {
        let phase_id = phase_id.into();
        Self {
            message: format!("Phase '{phase_id}' over-allocated by {excess} person-days"),
            kind: WarningKind::EffortOverAllocated,
            entity_id: phase_id,
            severity: 50,
        }
    }

    /// Resource allocated above 100%.
    pub fn resource_over_allocated(resource_id: impl Into<String>, allocation: f64) -> Self {
        let resource_id = resource_id.into();
        Self {
            message: format!("Resource '{resource_id}' allocated at {allocation}%"),
            kind: WarningKind::ResourceOverAllocated,
            entity_id: resource_id,
            severity: 40,
        }
    }

    /// Task outside its phase after the phase moved or shrank.
    pub fn task_outside_phase(task_id: impl Into<String>, phase_id: &str) -> Self {
        let task_id = task_id.into();
        Self {
            message: format!("Task '{task_id}' now falls outside phase '{phase_id}'"),
            kind: WarningKind::TaskOutsidePhase,
            entity_id: task_id,
            severity: 70,
        }
    }

    /// Manual edits that regeneration would discard.
    pub fn manual_edits_at_risk(count: usize, phase_names: &[String]) -> Self {
        Self {
            kind: WarningKind::ManualEditsAtRisk,
            entity_id: String::new(),
            message: format!(
                "{count} manual edit(s) will be lost on regeneration (phases: {})",
                phase_names.join(", ")
            ),
            severity: 80,
        }
    }

    /// Fallback rate applied for a resource.
    pub fn fallback_rate_used(resource_id: impl Into<String>, rate: f64) -> Self {
        let resource_id = resource_id.into();
        Self {
            message: format!("No rate card entry for resource '{resource_id}'; using {rate}/h"),
            kind: WarningKind::FallbackRateUsed,
            entity_id: resource_id,
            severity: 20,
        }
    }
}
