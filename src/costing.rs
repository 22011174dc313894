//! Resource costing.
//!
//! # Formula
//!
//! ```text
//! hours = phase_working_days × 8 × (allocation / 100)
//! cost  = hours × hourly_rate
//! ```
//!
//! Allocation above 100% scales cost linearly; it is flagged elsewhere, not
//! rejected here. A phase with no resources costs zero.
//!
//! # Rate Suggestion
//! [`RateCard::suggest`] proposes an hourly rate from a role base rate and a
//! regional multiplier. The suggestion is advisory: `Resource::hourly_rate`
//! is always a stored field and is never replaced behind the user's back.
//! Unknown roles or regions get the card's fallback rate so that a total
//! cost can always be shown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::calendar::Region;
use crate::models::{Phase, Resource, Role};

/// Billable hours per working day.
pub const HOURS_PER_DAY: f64 = 8.0;

/// Rate used when the card has no entry for a role or region.
pub const DEFAULT_FALLBACK_RATE: f64 = 150.0;

/// Cost of one resource over a phase of `phase_working_days`.
pub fn resource_cost(resource: &Resource, phase_working_days: i64) -> f64 {
    let hours = phase_working_days as f64 * HOURS_PER_DAY * resource.allocation_fraction();
    hours * resource.hourly_rate
}

/// Sum of resource costs over the phase's own duration.
pub fn phase_cost(phase: &Phase) -> f64 {
    phase
        .resources
        .iter()
        .map(|r| resource_cost(r, phase.working_days()))
        .sum()
}

/// Sum of phase costs.
pub fn project_cost(phases: &[Phase]) -> f64 {
    phases.iter().map(phase_cost).sum()
}

/// Per-resource cost lines of a phase, in resource order.
pub fn phase_cost_lines(phase: &Phase) -> Vec<(String, f64)> {
    phase
        .resources
        .iter()
        .map(|r| (r.id.clone(), resource_cost(r, phase.working_days())))
        .collect()
}

/// Outcome of a rate lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSuggestion {
    /// Suggested hourly rate.
    pub rate: f64,
    /// Whether the fallback rate was used.
    pub is_fallback: bool,
}

/// Role × region rate table.
///
/// `suggest(role, region) = base_rates[role] × regional_multipliers[region]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateCard {
    /// Base hourly rate per role key (multiplier 1.0 region).
    pub base_rates: BTreeMap<String, f64>,
    /// Multiplier per region key.
    pub regional_multipliers: BTreeMap<Region, f64>,
    /// Rate returned for unknown roles or regions.
    pub fallback_rate: f64,
}

impl Default for RateCard {
    fn default() -> Self {
        let base_rates = [
            (Role::Lead, 220.0),
            (Role::Architect, 200.0),
            (Role::Consultant, 180.0),
            (Role::Developer, 140.0),
            (Role::Analyst, 120.0),
            (Role::Tester, 100.0),
        ]
        .into_iter()
        .map(|(role, rate)| (role.key().to_string(), rate))
        .collect();

        let regional_multipliers = [
            (Region::malaysia(), 1.0),
            (Region::singapore(), 1.35),
            (Region::vietnam(), 0.6),
        ]
        .into_iter()
        .collect();

        Self {
            base_rates,
            regional_multipliers,
            fallback_rate: DEFAULT_FALLBACK_RATE,
        }
    }
}

impl RateCard {
    /// Creates an empty card: every lookup returns `fallback_rate`.
    pub fn empty(fallback_rate: f64) -> Self {
        Self {
            base_rates: BTreeMap::new(),
            regional_multipliers: BTreeMap::new(),
            fallback_rate,
        }
    }

    /// Sets a role base rate.
    pub fn with_base_rate(mut self, role: &Role, rate: f64) -> Self {
        self.base_rates.insert(role.key().to_string(), rate);
        self
    }

    /// Sets a regional multiplier.
    pub fn with_multiplier(mut self, region: impl Into<Region>, multiplier: f64) -> Self {
        self.regional_multipliers.insert(region.into(), multiplier);
        self
    }

    /// Suggests an hourly rate for `(role, region)`.
    pub fn suggest(&self, role: &Role, region: &Region) -> RateSuggestion {
        let base = self.base_rates.get(role.key().as_ref());
        let multiplier = self.regional_multipliers.get(region);
        match (base, multiplier) {
            (Some(base), Some(multiplier)) => RateSuggestion {
                rate: base * multiplier,
                is_fallback: false,
            },
            _ => {
                warn!(
                    role = %role,
                    region = %region,
                    fallback_rate = self.fallback_rate,
                    "no rate card entry, using fallback rate"
                );
                RateSuggestion {
                    rate: self.fallback_rate,
                    is_fallback: true,
                }
            }
        }
    }

    /// Sets `resource.hourly_rate` from the card unless the rate is manual.
    ///
    /// Returns the suggestion applied, or `None` when a manual rate was kept.
    pub fn fill_rate(&self, resource: &mut Resource) -> Option<RateSuggestion> {
        if resource.has_manual_rate() {
            return None;
        }
        let suggestion = self.suggest(&resource.role, &resource.region);
        resource.hourly_rate = suggestion.rate;
        Some(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consultant(allocation: f64, rate: f64) -> Resource {
        Resource::new("R1", Role::Consultant, "MY")
            .with_allocation(allocation)
            .with_hourly_rate(rate)
    }

    #[test]
    fn test_resource_cost_formula() {
        // 20 days × 8h × 1.0 × 180
        assert!((resource_cost(&consultant(100.0, 180.0), 20) - 28_800.0).abs() < 1e-9);
        // Half allocation halves cost
        assert!((resource_cost(&consultant(50.0, 180.0), 20) - 14_400.0).abs() < 1e-9);
        // Over-allocation scales linearly
        assert!((resource_cost(&consultant(150.0, 100.0), 10) - 12_000.0).abs() < 1e-9);
        assert!((resource_cost(&consultant(100.0, 180.0), 0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_and_project_cost() {
        let p1 = Phase::new("P1", "Explore")
            .with_schedule(0, 10)
            .with_resource(consultant(100.0, 100.0))
            .with_resource(
                Resource::new("R2", Role::Developer, "VN")
                    .with_allocation(50.0)
                    .with_hourly_rate(80.0),
            );
        let p2 = Phase::new("P2", "Empty").with_schedule(10, 5);

        // 10×8×100 + 10×8×0.5×80 = 8000 + 3200
        assert!((phase_cost(&p1) - 11_200.0).abs() < 1e-9);
        assert!((phase_cost(&p2) - 0.0).abs() < 1e-9);
        assert!((project_cost(&[p1.clone(), p2]) - 11_200.0).abs() < 1e-9);
        assert!((project_cost(&[]) - 0.0).abs() < 1e-9);

        let lines = phase_cost_lines(&p1);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].0, "R2");
        assert!((lines[1].1 - 3_200.0).abs() < 1e-9);
    }

    #[test]
    fn test_suggest_known_role_region() {
        let card = RateCard::default();
        let s = card.suggest(&Role::Consultant, &Region::malaysia());
        assert!((s.rate - 180.0).abs() < 1e-9);
        assert!(!s.is_fallback);

        let s = card.suggest(&Role::Developer, &Region::vietnam());
        assert!((s.rate - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_suggest_falls_back() {
        let card = RateCard::default();
        let s = card.suggest(&Role::Custom("basis".into()), &Region::malaysia());
        assert!(s.is_fallback);
        assert!((s.rate - DEFAULT_FALLBACK_RATE).abs() < 1e-9);

        let s = card.suggest(&Role::Lead, &Region::new("JP"));
        assert!(s.is_fallback);

        let s = RateCard::empty(99.0).suggest(&Role::Lead, &Region::malaysia());
        assert!((s.rate - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_role_does_not_borrow_standard_rate() {
        let card = RateCard::default();
        let s = card.suggest(&Role::Custom("lead".into()), &Region::malaysia());
        assert!(s.is_fallback);
        assert!((s.rate - DEFAULT_FALLBACK_RATE).abs() < 1e-9);

        let card = card.with_base_rate(&Role::Custom("lead".into()), 90.0);
        assert!(card.base_rates.contains_key("custom:lead"));
        let s = card.suggest(&Role::Custom("lead".into()), &Region::malaysia());
        assert!((s.rate - 90.0).abs() < 1e-9);
        let s = card.suggest(&Role::Lead, &Region::malaysia());
        assert!((s.rate - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_rate_respects_manual() {
        let card = RateCard::default()
            .with_base_rate(&Role::Tester, 110.0)
            .with_multiplier("SG", 2.0);

        let mut manual = Resource::new("R1", Role::Tester, "SG").with_hourly_rate(90.0);
        assert!(card.fill_rate(&mut manual).is_none());
        assert!((manual.hourly_rate - 90.0).abs() < 1e-9);

        let mut suggested = Resource::new("R2", Role::Tester, "SG");
        let s = card.fill_rate(&mut suggested).unwrap();
        assert!((s.rate - 220.0).abs() < 1e-9);
        assert!((suggested.hourly_rate - 220.0).abs() < 1e-9);
    }
}
