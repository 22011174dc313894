//! Timeline domain models.
//!
//! Plain data records exchanged with the host application: phases, tasks,
//! resources, manual overrides and warnings. Derived fields (task working
//! days, phase calendar dates) are recomputed by the engine and exposed
//! through getters only.
//!
//! # Ownership
//!
//! | Record | Owned by | Removed with |
//! |--------|----------|--------------|
//! | Phase | Timeline | explicit deletion |
//! | Task | one Phase | its Phase |
//! | Resource | one Phase | its Phase |
//! | ManualOverride | Timeline | its Phase, or regeneration |
//! | IntegrationRecord | Timeline | either referenced Phase |

mod overrides;
mod phase;
mod resource;
mod span;
mod task;
mod warning;

pub use overrides::{IntegrationRecord, ManualOverride, OverrideField};
pub use phase::Phase;
pub use resource::{RateSource, Resource, Role, CUSTOM_ROLE_PREFIX, FULL_ALLOCATION, MAX_ALLOCATION};
pub use span::DateSpan;
pub use task::{Task, TaskStatus};
pub use warning::{Warning, WarningKind};
