//! Engine configuration.
//!
//! Loaded from TOML. Every field is optional; an empty document yields the
//! built-in calendars and the default rate card.
//!
//! ```toml
//! default_region = "MY"
//!
//! [rate_card]
//! fallback_rate = 150.0
//! base_rates = { consultant = 190.0 }
//! regional_multipliers = { SG = 1.4 }
//!
//! [[calendars]]
//! region = "MY"
//! extra_holidays = ["2025-12-31"]
//!
//! [[calendars]]
//! region = "TH"
//! extra_holidays = ["2025-04-14", "2025-04-15"]
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::calendar::{CalendarRegistry, Region, WorkingCalendar};
use crate::costing::RateCard;
use crate::error::ConfigurationError;

/// Holiday adjustments for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Region key. Unknown keys define a new region.
    pub region: String,

    /// Additional holidays, `YYYY-MM-DD`.
    #[serde(default)]
    pub extra_holidays: Vec<String>,

    /// Drop the built-in holidays of this region first.
    #[serde(default)]
    pub replace: bool,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Region used when the host does not name one.
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Role and region rate table.
    #[serde(default)]
    pub rate_card: RateCard,

    /// Holiday calendar adjustments.
    #[serde(default)]
    pub calendars: Vec<CalendarConfig>,
}

fn default_region() -> String {
    Region::MALAYSIA.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            rate_card: RateCard::default(),
            calendars: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigurationError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), calendars = config.calendars.len(), "engine config loaded");
        Ok(config)
    }

    /// Checks rates and holiday dates, and that the default region resolves.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let card = &self.rate_card;
        if !is_rate(card.fallback_rate) {
            return Err(ConfigurationError::InvalidRateCard(format!(
                "fallback_rate must be a non-negative amount, got {}",
                card.fallback_rate
            )));
        }
        for (role, &rate) in &card.base_rates {
            if !is_rate(rate) {
                return Err(ConfigurationError::InvalidRateCard(format!(
                    "base rate for '{role}' must be a non-negative amount, got {rate}"
                )));
            }
        }
        for (region, &multiplier) in &card.regional_multipliers {
            if !is_rate(multiplier) {
                return Err(ConfigurationError::InvalidRateCard(format!(
                    "multiplier for '{region}' must be a non-negative number, got {multiplier}"
                )));
            }
        }

        let registry = self.calendar_registry()?;
        registry.get(&self.default_region)?;
        Ok(())
    }

    /// Built-in calendars with the configured adjustments applied.
    pub fn calendar_registry(&self) -> Result<CalendarRegistry, ConfigurationError> {
        let mut registry = CalendarRegistry::builtin();
        for entry in &self.calendars {
            let region = Region::new(entry.region.as_str());
            let dates = entry
                .extra_holidays
                .iter()
                .map(|value| parse_holiday(&region, value))
                .collect::<Result<Vec<_>, _>>()?;

            if entry.replace {
                registry.insert(WorkingCalendar::new(region.clone()));
            }
            registry.extend_holidays(&region, dates);
        }
        Ok(registry)
    }

    /// The configured rate card.
    pub fn rate_card(&self) -> RateCard {
        self.rate_card.clone()
    }
}

fn is_rate(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn parse_holiday(region: &Region, value: &str) -> Result<NaiveDate, ConfigurationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ConfigurationError::InvalidHoliday {
            region: region.to_string(),
            value: value.to_string(),
        }
    })
}
