//! Resource (staffing) model.
//!
//! A resource is a person-profile staffed onto one phase: a role, a
//! region, an allocation percentage and an hourly rate. The rate is a
//! stored field; the rate card only ever suggests a value.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::calendar::Region;

/// Key prefix that keeps custom role keys apart from the standard ones.
pub const CUSTOM_ROLE_PREFIX: &str = "custom:";

/// Highest accepted allocation (percent).
pub const MAX_ALLOCATION: f64 = 200.0;

/// Allocation above which a resource is flagged as over-allocated.
pub const FULL_ALLOCATION: f64 = 100.0;

/// Staffing profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Lead,
    Architect,
    Consultant,
    Developer,
    Analyst,
    Tester,
    /// Any profile outside the standard set.
    Custom(String),
}

impl Role {
    /// Parses a role key; unrecognized keys become [`Role::Custom`].
    ///
    /// `custom:<name>` always yields a custom role, even when `<name>` is a
    /// standard key.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        if let Some(name) = key.strip_prefix(CUSTOM_ROLE_PREFIX) {
            return Role::Custom(name.trim().to_string());
        }
        match key.to_ascii_lowercase().as_str() {
            "lead" => Role::Lead,
            "architect" => Role::Architect,
            "consultant" => Role::Consultant,
            "developer" => Role::Developer,
            "analyst" => Role::Analyst,
            "tester" => Role::Tester,
            _ => Role::Custom(key.to_string()),
        }
    }

    /// Stable key used in rate cards and configuration.
    ///
    /// Custom roles are keyed `custom:<name>`.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            Role::Lead => Cow::Borrowed("lead"),
            Role::Architect => Cow::Borrowed("architect"),
            Role::Consultant => Cow::Borrowed("consultant"),
            Role::Developer => Cow::Borrowed("developer"),
            Role::Analyst => Cow::Borrowed("analyst"),
            Role::Tester => Cow::Borrowed("tester"),
            Role::Custom(name) => Cow::Owned(format!("{CUSTOM_ROLE_PREFIX}{name}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Custom(name) => f.write_str(name),
            standard => f.write_str(&standard.key()),
        }
    }
}

/// Where a resource's hourly rate came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Filled from the rate card; may be refreshed by the engine.
    #[default]
    Suggested,
    /// Entered by a user; only replaced on explicit request.
    Manual,
}

/// A staffed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier (unique within its phase).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Staffing profile.
    pub role: Role,
    /// Region key (selects rate multiplier).
    pub region: Region,
    /// Share of time committed to the phase, percent (0..=200).
    pub allocation: f64,
    /// Currency amount per hour.
    pub hourly_rate: f64,
    /// Origin of `hourly_rate`.
    pub rate_source: RateSource,
}

impl Resource {
    /// Creates a fully allocated resource with no rate yet.
    pub fn new(id: impl Into<String>, role: Role, region: impl Into<Region>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            role,
            region: region.into(),
            allocation: FULL_ALLOCATION,
            hourly_rate: 0.0,
            rate_source: RateSource::Suggested,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the allocation percentage.
    pub fn with_allocation(mut self, allocation: f64) -> Self {
        self.allocation = allocation;
        self
    }

    /// Sets a manual hourly rate.
    pub fn with_hourly_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = hourly_rate;
        self.rate_source = RateSource::Manual;
        self
    }

    /// Allocation as a fraction (100% = 1.0).
    #[inline]
    pub fn allocation_fraction(&self) -> f64 {
        self.allocation / 100.0
    }

    /// Whether allocation exceeds 100%.
    pub fn is_over_allocated(&self) -> bool {
        self.allocation > FULL_ALLOCATION
    }

    /// Whether the rate was entered by hand.
    pub fn has_manual_rate(&self) -> bool {
        self.rate_source == RateSource::Manual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_builder() {
        let r = Resource::new("R1", Role::Consultant, "my")
            .with_name("FI Consultant")
            .with_allocation(50.0)
            .with_hourly_rate(180.0);

        assert_eq!(r.id, "R1");
        assert_eq!(r.name, "FI Consultant");
        assert_eq!(r.region, Region::malaysia());
        assert!((r.allocation_fraction() - 0.5).abs() < 1e-10);
        assert!((r.hourly_rate - 180.0).abs() < 1e-10);
        assert!(r.has_manual_rate());
        assert!(!r.is_over_allocated());
    }

    #[test]
    fn test_resource_defaults() {
        let r = Resource::new("R1", Role::Tester, "SG");
        assert!((r.allocation - 100.0).abs() < 1e-10);
        assert_eq!(r.rate_source, RateSource::Suggested);
        assert!(!r.is_over_allocated());
        assert!(r.with_allocation(120.0).is_over_allocated());
    }

    #[test]
    fn test_role_keys() {
        assert_eq!(Role::from_key("Architect"), Role::Architect);
        assert_eq!(Role::from_key(" tester "), Role::Tester);
        assert_eq!(Role::from_key("Basis Admin"), Role::Custom("Basis Admin".into()));
        assert_eq!(Role::Lead.key(), "lead");
        assert_eq!(Role::Custom("pmo".into()).to_string(), "pmo");
    }

    #[test]
    fn test_custom_role_key_is_namespaced() {
        let custom_lead = Role::Custom("lead".into());
        assert_ne!(custom_lead.key(), Role::Lead.key());
        assert_eq!(custom_lead.key(), "custom:lead");
        assert_eq!(Role::from_key(&custom_lead.key()), custom_lead);
        assert_eq!(Role::from_key("custom: Trainer"), Role::Custom("Trainer".into()));
        assert_eq!(Role::from_key("lead"), Role::Lead);
    }
}
