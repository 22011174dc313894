//! Timeline scheduling and costing engine.
//!
//! Plans a project as an ordered sequence of phases measured in working days
//! under a region's holiday calendar, keeps tasks inside their phases, costs
//! staffed resources and tracks effort budgets. A regenerated plan is
//! compared against the current one before it may replace it.
//!
//! # Modules
//!
//! - **`calendar`**: Region keys, holiday calendars, working-day arithmetic
//! - **`models`**: Domain records: `Phase`, `Task`, `Resource`,
//!   `ManualOverride`, `IntegrationRecord`, `Warning`
//! - **`containment`**: Task-in-phase invariant and edit application
//! - **`costing`**: Resource/phase/project cost and the `RateCard`
//! - **`effort`**: Authorized vs allocated person-days
//! - **`diff`**: Regeneration diff and confirmation
//! - **`estimate`**: Effort, duration and generated phases from scope inputs
//! - **`timeline`**: The `Timeline` aggregate and its atomic operations
//! - **`summary`**: Headline indicators of a timeline
//! - **`validation`**: Integrity checks for externally supplied data
//! - **`config`**: TOML engine configuration
//! - **`error`**: `Rejection`, `ConfigurationError`, `EngineError`
//!
//! # Error Model
//!
//! A rejected edit returns `Err` and leaves state unchanged. Advisory
//! conditions (over-allocation, tasks left outside a shrunk phase) come
//! back as `Warning`s alongside a successful result.
//!
//! # Logging
//!
//! Operations emit `tracing` events. The crate never installs a subscriber.

pub mod calendar;
pub mod config;
pub mod containment;
pub mod costing;
pub mod diff;
pub mod effort;
pub mod error;
pub mod estimate;
pub mod models;
pub mod summary;
pub mod timeline;
pub mod validation;

pub use calendar::{add_working_days, calculate_working_days, CalendarRegistry, Region};
pub use config::EngineConfig;
pub use error::{ConfigurationError, EngineError, Rejection, RejectionKind};
pub use timeline::{MutationOutcome, Timeline};
