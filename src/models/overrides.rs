//! Manual override and integration records.

use serde::{Deserialize, Serialize};

/// Field a user changed after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    Name,
    StartDate,
    EndDate,
    WorkingDays,
    Effort,
    Status,
    /// Resource set (added, removed or edited).
    Resources,
    /// Task set (added or removed).
    Tasks,
    /// Entity created by hand rather than generated.
    Created,
}

/// A human edit made after the timeline was generated.
///
/// Every override is tied to a phase; task-level edits also carry the task id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManualOverride {
    /// Owning phase.
    pub phase_id: String,
    /// Edited task, if the edit was task-level.
    pub task_id: Option<String>,
    /// Edited field.
    pub field: OverrideField,
}

impl ManualOverride {
    /// Phase-level override.
    pub fn phase(phase_id: impl Into<String>, field: OverrideField) -> Self {
        Self {
            phase_id: phase_id.into(),
            task_id: None,
            field,
        }
    }

    /// Task-level override.
    pub fn task(
        phase_id: impl Into<String>,
        task_id: impl Into<String>,
        field: OverrideField,
    ) -> Self {
        Self {
            phase_id: phase_id.into(),
            task_id: Some(task_id.into()),
            field,
        }
    }
}

/// A cross-phase integration link (e.g. an interface built in one phase and
/// tested in another).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: String,
    pub from_phase: String,
    pub to_phase: String,
    pub description: String,
}

impl IntegrationRecord {
    pub fn new(
        id: impl Into<String>,
        from_phase: impl Into<String>,
        to_phase: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_phase: from_phase.into(),
            to_phase: to_phase.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether either end of the link is `phase_id`.
    pub fn references(&self, phase_id: &str) -> bool {
        self.from_phase == phase_id || self.to_phase == phase_id
    }
}
