//! Error taxonomy.
//!
//! Two failure classes exist:
//!
//! - [`Rejection`]: a recoverable, expected refusal of a single edit
//!   (containment violation, negative duration, unknown id). The caller's
//!   state is left unchanged and the message is meant for the user.
//! - [`ConfigurationError`]: a deployment or data-integrity fault, such as a
//!   region key with no holiday calendar. These are not user mistakes.
//!
//! Advisory conditions (over-allocation, manual edits at risk) are not
//! errors at all; see [`Warning`](crate::models::Warning).

use thiserror::Error;

/// Hard configuration fault.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No holiday calendar is registered for the region key.
    #[error("unknown region '{0}': no holiday calendar is registered")]
    UnknownRegion(String),

    /// A configured holiday could not be parsed as a calendar date.
    #[error("invalid holiday '{value}' for region '{region}'")]
    InvalidHoliday { region: String, value: String },

    /// The rate card contains an unusable value.
    #[error("invalid rate card: {0}")]
    InvalidRateCard(String),

    /// The document is not a valid [`EngineConfig`](crate::config::EngineConfig).
    #[error("configuration parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("configuration file unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// Categories of rejected edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Task span would leave its owning phase's span.
    OutsidePhase,
    /// End date precedes start date.
    EndBeforeStart,
    /// Working-day duration below zero.
    NegativeDuration,
    /// Allocation outside 0..=200 percent.
    AllocationOutOfRange,
    /// Hourly rate below zero or not finite.
    NegativeRate,
    /// Effort (person-days) below zero or not finite.
    NegativeEffort,
    /// Referenced phase does not exist.
    UnknownPhase,
    /// Referenced task does not exist.
    UnknownTask,
    /// Referenced resource does not exist.
    UnknownResource,
    /// Two entities share the same id.
    DuplicateId,
    /// A stored derived field disagrees with its recomputed value.
    StaleDerivedField,
    /// The timeline changed after a regeneration diff was confirmed.
    StaleConfirmation,
    /// Estimation inputs that cannot produce a schedule.
    InvalidEstimateInput,
}

/// A refused edit, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct Rejection {
    /// Rejection category.
    pub kind: RejectionKind,
    /// Human-readable description.
    pub message: String,
}

impl Rejection {
    /// Creates a rejection.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn unknown_phase(phase_id: &str) -> Self {
        Self::new(
            RejectionKind::UnknownPhase,
            format!("Phase '{phase_id}' does not exist"),
        )
    }

    pub(crate) fn unknown_task(phase_id: &str, task_id: &str) -> Self {
        Self::new(
            RejectionKind::UnknownTask,
            format!("Task '{task_id}' does not exist in phase '{phase_id}'"),
        )
    }

    pub(crate) fn unknown_resource(phase_id: &str, resource_id: &str) -> Self {
        Self::new(
            RejectionKind::UnknownResource,
            format!("Resource '{resource_id}' does not exist in phase '{phase_id}'"),
        )
    }

    pub(crate) fn negative_duration(working_days: i64) -> Self {
        Self::new(
            RejectionKind::NegativeDuration,
            format!("Working days must be zero or more, got {working_days}"),
        )
    }

    pub(crate) fn negative_effort(effort: f64) -> Self {
        Self::new(
            RejectionKind::NegativeEffort,
            format!("Effort must be a non-negative number of person-days, got {effort}"),
        )
    }
}

/// Any failure of an engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The edit was refused; state is unchanged.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Several issues were found in a phase set; state is unchanged.
    #[error("{} validation issue(s)", .0.len())]
    Invalid(Vec<Rejection>),

    /// The engine is misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl EngineError {
    /// Wraps collected rejections, unwrapping a single one.
    pub fn from_rejections(mut rejections: Vec<Rejection>) -> Self {
        if rejections.len() == 1 {
            EngineError::Rejected(rejections.remove(0))
        } else {
            EngineError::Invalid(rejections)
        }
    }

    /// Returns the (first) rejection, if this is one.
    pub fn as_rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(r) => Some(r),
            EngineError::Invalid(rs) => rs.first(),
            EngineError::Configuration(_) => None,
        }
    }

    /// All rejections carried by this error.
    pub fn rejections(&self) -> Vec<&Rejection> {
        match self {
            EngineError::Rejected(r) => vec![r],
            EngineError::Invalid(rs) => rs.iter().collect(),
            EngineError::Configuration(_) => Vec::new(),
        }
    }

    /// Rejection kind, if this is a rejection.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        self.as_rejection().map(|r| r.kind)
    }
}
