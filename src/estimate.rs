//! Effort and duration estimation.
//!
//! Turns a scope description (selected scope items, integrations, forms,
//! organisation size) and a staffing profile into total person-days, a
//! duration in months and a five-phase split. [`Estimate::phases`] yields
//! the generated phase set that [`Timeline::install_generated`] and
//! [`Timeline::diff_against`] consume.
//!
//! # Formula
//!
//! ```text
//! sb = max(0, Σ coefficient + 0.02 × integrations)
//! pc = max(0, 0.01 × max(0, forms - 10) + 0.25 × max(0, 1 - fit))
//! os = 0.03 × (entities - 1) + 0.05 × (countries - 1) + 0.02 × (languages - 1)
//!
//! e_ft     = base_ft × (1 + sb) × (1 + pc) × (1 + os)
//! e_fixed  = basis + security_auth
//! capacity = fte × 20 × utilization
//!
//! d     = (e_ft + e_fixed) / capacity × overlap
//! e_pmo = 10 × d                                   (iterated to a fixed point)
//! total = e_ft + e_fixed + e_pmo
//! ```
//!
//! Scope items of tier `D` are listed but carry no weight.
//!
//! # Phases
//!
//! | Phase | Weight |
//! |-------|--------|
//! | Prepare | 0.10 |
//! | Explore | 0.15 |
//! | Realize | 0.50 |
//! | Deploy | 0.15 |
//! | Run | 0.10 |
//!
//! Each phase gets `weight × total` person-days and `weight × d` months,
//! rounded to whole working days at 20 per month.
//!
//! [`Timeline::install_generated`]: crate::timeline::Timeline::install_generated
//! [`Timeline::diff_against`]: crate::timeline::Timeline::diff_against

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Rejection, RejectionKind};
use crate::models::Phase;
use crate::validation::check_effort;

/// Working days in one estimation month.
pub const WORKING_DAYS_PER_MONTH: f64 = 20.0;

const INTEGRATION_FACTOR: f64 = 0.02;
const EXTRA_FORM_FACTOR: f64 = 0.01;
const BASELINE_FORMS: u32 = 10;
const FIT_GAP_FACTOR: f64 = 0.25;
const ENTITY_FACTOR: f64 = 0.03;
const COUNTRY_FACTOR: f64 = 0.05;
const LANGUAGE_FACTOR: f64 = 0.02;

/// Project management person-days per month of duration.
const PMO_MONTHLY_RATE: f64 = 10.0;
const MAX_PMO_ITERATIONS: usize = 10;
const PMO_CONVERGENCE_MONTHS: f64 = 0.01;

/// Phase names and their share of effort and duration.
pub const PHASE_WEIGHTS: [(&str, f64); 5] = [
    ("Prepare", 0.10),
    ("Explore", 0.15),
    ("Realize", 0.50),
    ("Deploy", 0.15),
    ("Run", 0.10),
];

/// Delivery tier of a scope item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeTier {
    #[default]
    A,
    B,
    C,
    /// Deferred; excluded from scope breadth.
    D,
}

/// One selected scope item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub code: String,
    /// Contribution to scope breadth.
    pub coefficient: f64,
    #[serde(default)]
    pub tier: ScopeTier,
}

impl ScopeItem {
    pub fn new(code: impl Into<String>, coefficient: f64, tier: ScopeTier) -> Self {
        Self {
            code: code.into(),
            coefficient,
            tier,
        }
    }
}

/// Baseline effort of a delivery profile, in person-days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Functional baseline, scaled by the coefficients.
    pub base_ft: f64,
    /// Fixed technical baseline.
    pub basis: f64,
    /// Fixed security and authorisation effort.
    pub security_auth: f64,
}

impl Profile {
    pub fn new(name: impl Into<String>, base_ft: f64, basis: f64, security_auth: f64) -> Self {
        Self {
            name: name.into(),
            base_ft,
            basis,
            security_auth,
        }
    }
}

/// Everything the estimate depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateInputs {
    pub scope_items: Vec<ScopeItem>,
    pub integrations: u32,
    pub custom_forms: u32,
    /// Share of requirements met by the standard product (0.0..=1.0).
    pub fit_to_standard: f64,
    pub legal_entities: u32,
    pub countries: u32,
    pub languages: u32,
    pub profile: Profile,
    /// Full-time equivalents staffed.
    pub fte: f64,
    /// Productive share of each FTE (0.0..=1.0).
    pub utilization: f64,
    /// Duration multiplier for phase overlap.
    pub overlap_factor: f64,
}

impl Default for EstimateInputs {
    fn default() -> Self {
        Self {
            scope_items: Vec::new(),
            integrations: 0,
            custom_forms: 0,
            fit_to_standard: 1.0,
            legal_entities: 1,
            countries: 1,
            languages: 1,
            profile: Profile::default(),
            fte: 1.0,
            utilization: 1.0,
            overlap_factor: 1.0,
        }
    }
}

impl EstimateInputs {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn with_scope_item(mut self, item: ScopeItem) -> Self {
        self.scope_items.push(item);
        self
    }

    pub fn with_integrations(mut self, integrations: u32) -> Self {
        self.integrations = integrations;
        self
    }

    pub fn with_custom_forms(mut self, custom_forms: u32) -> Self {
        self.custom_forms = custom_forms;
        self
    }

    pub fn with_fit_to_standard(mut self, fit: f64) -> Self {
        self.fit_to_standard = fit;
        self
    }

    /// Sets legal entity, country and language counts.
    pub fn with_organisation(
        mut self,
        legal_entities: u32,
        countries: u32,
        languages: u32,
    ) -> Self {
        self.legal_entities = legal_entities;
        self.countries = countries;
        self.languages = languages;
        self
    }

    /// Sets FTE, utilization and overlap factor.
    pub fn with_staffing(mut self, fte: f64, utilization: f64, overlap_factor: f64) -> Self {
        self.fte = fte;
        self.utilization = utilization;
        self.overlap_factor = overlap_factor;
        self
    }

    /// Person-days the team delivers per month.
    pub fn capacity_per_month(&self) -> f64 {
        self.fte * WORKING_DAYS_PER_MONTH * self.utilization
    }
}

/// Scaling coefficients applied to the functional baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub scope_breadth: f64,
    pub process_complexity: f64,
    pub org_scale: f64,
}

impl Coefficients {
    /// Computes the coefficients of `inputs`.
    pub fn of(inputs: &EstimateInputs) -> Self {
        let item_sum: f64 = inputs
            .scope_items
            .iter()
            .filter(|item| item.tier != ScopeTier::D)
            .map(|item| item.coefficient)
            .sum();
        let integrations = f64::from(inputs.integrations) * INTEGRATION_FACTOR;
        let scope_breadth = (item_sum + integrations).max(0.0);

        let extra_forms = inputs.custom_forms.saturating_sub(BASELINE_FORMS);
        let fit_gap = (1.0 - inputs.fit_to_standard).max(0.0);
        let process_complexity =
            (f64::from(extra_forms) * EXTRA_FORM_FACTOR + fit_gap * FIT_GAP_FACTOR).max(0.0);

        let org_scale = f64::from(inputs.legal_entities.saturating_sub(1)) * ENTITY_FACTOR
            + f64::from(inputs.countries.saturating_sub(1)) * COUNTRY_FACTOR
            + f64::from(inputs.languages.saturating_sub(1)) * LANGUAGE_FACTOR;

        Self {
            scope_breadth,
            process_complexity,
            org_scale,
        }
    }

    /// Combined multiplier on the functional baseline.
    pub fn multiplier(&self) -> f64 {
        (1.0 + self.scope_breadth) * (1.0 + self.process_complexity) * (1.0 + self.org_scale)
    }
}

/// Effort and duration of one generated phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEstimate {
    pub name: String,
    pub weight: f64,
    /// Person-days.
    pub effort: f64,
    pub months: f64,
    /// `months` rounded to whole working days.
    pub working_days: i64,
}

/// Result of [`estimate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub coefficients: Coefficients,
    /// Scaled functional effort `e_ft` (person-days).
    pub functional_effort: f64,
    /// Fixed effort `e_fixed` (person-days).
    pub fixed_effort: f64,
    /// Project management effort at the fixed point (person-days).
    pub pmo_effort: f64,
    /// Functional plus fixed plus project management effort.
    pub total_effort: f64,
    pub capacity_per_month: f64,
    /// Duration before project management effort is added.
    pub raw_duration_months: f64,
    pub duration_months: f64,
    /// Fixed-point iterations run.
    pub iterations: usize,
    /// Whether the duration settled within tolerance.
    pub converged: bool,
    pub phases: Vec<PhaseEstimate>,
}

impl Estimate {
    /// Total working days over all phases.
    pub fn working_days(&self) -> i64 {
        self.phases.iter().map(|p| p.working_days).sum()
    }

    /// Consecutive timeline phases, ordered and budgeted from the estimate.
    pub fn phases(&self) -> Vec<Phase> {
        let mut offset = 0;
        self.phases
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let phase = Phase::new(p.name.to_ascii_lowercase(), p.name.clone())
                    .with_order(i as i32)
                    .with_schedule(offset, p.working_days)
                    .with_effort(p.effort);
                offset += p.working_days;
                phase
            })
            .collect()
    }
}

/// Estimates effort and duration.
///
/// # Errors
/// `InvalidEstimateInput` when capacity or the overlap factor is not a
/// positive amount, or a ratio is not finite. `NegativeEffort` for a
/// negative profile baseline.
pub fn estimate(inputs: &EstimateInputs) -> Result<Estimate, Rejection> {
    let profile = &inputs.profile;
    for effort in [profile.base_ft, profile.basis, profile.security_auth] {
        check_effort(effort)?;
    }
    let capacity = inputs.capacity_per_month();
    if !(capacity.is_finite() && capacity > 0.0) {
        return Err(invalid_input(format!(
            "Capacity must be positive, got {capacity} person-days per month"
        )));
    }
    let overlap = inputs.overlap_factor;
    if !(overlap.is_finite() && overlap > 0.0) {
        return Err(invalid_input(format!("Overlap factor must be positive, got {overlap}")));
    }
    if !inputs.fit_to_standard.is_finite()
        || inputs.scope_items.iter().any(|item| !item.coefficient.is_finite())
    {
        return Err(invalid_input("Scope coefficients and fit-to-standard must be finite"));
    }

    let coefficients = Coefficients::of(inputs);
    let functional_effort = profile.base_ft * coefficients.multiplier();
    let fixed_effort = profile.basis + profile.security_auth;
    let base_effort = functional_effort + fixed_effort;

    let raw_duration_months = base_effort / capacity * overlap;
    let mut duration_months = raw_duration_months;
    let mut pmo_effort = 0.0;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_PMO_ITERATIONS {
        iterations += 1;
        let previous = duration_months;
        pmo_effort = duration_months * PMO_MONTHLY_RATE;
        duration_months = (base_effort + pmo_effort) / capacity * overlap;
        if (duration_months - previous).abs() < PMO_CONVERGENCE_MONTHS {
            converged = true;
            break;
        }
    }
    let total_effort = base_effort + pmo_effort;

    if converged {
        debug!(iterations, duration_months, total_effort, "estimate converged");
    } else {
        warn!(
            iterations,
            duration_months,
            capacity,
            "project management effort did not converge, using last iteration"
        );
    }

    let phases = PHASE_WEIGHTS
        .iter()
        .map(|&(name, weight)| {
            let months = duration_months * weight;
            PhaseEstimate {
                name: name.to_string(),
                weight,
                effort: total_effort * weight,
                months,
                working_days: (months * WORKING_DAYS_PER_MONTH).round() as i64,
            }
        })
        .collect();

    Ok(Estimate {
        coefficients,
        functional_effort,
        fixed_effort,
        pmo_effort,
        total_effort,
        capacity_per_month: capacity,
        raw_duration_months,
        duration_months,
        iterations,
        converged,
        phases,
    })
}

fn invalid_input(message: impl Into<String>) -> Rejection {
    Rejection::new(RejectionKind::InvalidEstimateInput, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> EstimateInputs {
        EstimateInputs::new(Profile::new("Core", 100.0, 20.0, 10.0))
    }

    #[test]
    fn test_coefficients() {
        let inputs = baseline()
            .with_scope_item(ScopeItem::new("FI", 0.2, ScopeTier::A))
            .with_scope_item(ScopeItem::new("HR", 0.5, ScopeTier::D))
            .with_integrations(5)
            .with_custom_forms(14)
            .with_fit_to_standard(0.8)
            .with_organisation(3, 2, 1);

        let c = Coefficients::of(&inputs);
        assert!((c.scope_breadth - 0.3).abs() < 1e-9);
        assert!((c.process_complexity - 0.09).abs() < 1e-9);
        assert!((c.org_scale - 0.11).abs() < 1e-9);
        assert!((c.multiplier() - 1.3 * 1.09 * 1.11).abs() < 1e-9);
    }

    #[test]
    fn test_coefficients_floor_at_zero() {
        let inputs = baseline()
            .with_scope_item(ScopeItem::new("X", -0.5, ScopeTier::B))
            .with_custom_forms(3)
            .with_fit_to_standard(1.4)
            .with_organisation(0, 0, 0);

        let c = Coefficients::of(&inputs);
        assert_eq!(c.scope_breadth, 0.0);
        assert_eq!(c.process_complexity, 0.0);
        assert_eq!(c.org_scale, 0.0);
    }

    #[test]
    fn test_pmo_fixed_point() {
        // 130 person-days at 20 per month: d settles at 13 months
        let est = estimate(&baseline()).unwrap();
        assert!((est.functional_effort - 100.0).abs() < 1e-9);
        assert!((est.fixed_effort - 30.0).abs() < 1e-9);
        assert!((est.raw_duration_months - 6.5).abs() < 1e-9);
        assert!(est.converged);
        assert_eq!(est.iterations, 10);
        assert!((est.duration_months - 12.993_652_343_75).abs() < 1e-9);
        assert!((est.pmo_effort - 129.873_046_875).abs() < 1e-9);
        assert!((est.total_effort - 259.873_046_875).abs() < 1e-9);
    }

    #[test]
    fn test_phase_split() {
        let est = estimate(&baseline()).unwrap();
        let days: Vec<i64> = est.phases.iter().map(|p| p.working_days).collect();
        assert_eq!(days, vec![26, 39, 130, 39, 26]);
        assert_eq!(est.working_days(), 260);

        let effort: f64 = est.phases.iter().map(|p| p.effort).sum();
        assert!((effort - est.total_effort).abs() < 1e-9);
        assert!((est.phases[2].effort - est.total_effort * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_generated_phases_are_consecutive() {
        let phases = estimate(&baseline()).unwrap().phases();
        let ids: Vec<&str> = phases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["prepare", "explore", "realize", "deploy", "run"]);

        let starts: Vec<i64> = phases.iter().map(Phase::start_business_day).collect();
        assert_eq!(starts, vec![0, 26, 65, 195, 234]);
        assert_eq!(phases[4].order, 4);
    }

    #[test]
    fn test_divergent_pmo_stops() {
        // Half an FTE spends every working day on project management
        let est = estimate(&baseline().with_staffing(0.5, 1.0, 1.0)).unwrap();
        assert!(!est.converged);
        assert_eq!(est.iterations, 10);
        assert!(est.duration_months > est.raw_duration_months);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let err = estimate(&baseline().with_staffing(0.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(err.kind, RejectionKind::InvalidEstimateInput);

        let err = estimate(&baseline().with_staffing(1.0, 0.8, 0.0)).unwrap_err();
        assert_eq!(err.kind, RejectionKind::InvalidEstimateInput);

        let err = estimate(&baseline().with_fit_to_standard(f64::NAN)).unwrap_err();
        assert_eq!(err.kind, RejectionKind::InvalidEstimateInput);

        let err = estimate(&EstimateInputs::new(Profile::new("Bad", -1.0, 0.0, 0.0))).unwrap_err();
        assert_eq!(err.kind, RejectionKind::NegativeEffort);
    }

    #[test]
    fn test_inputs_from_json() {
        let inputs: EstimateInputs = serde_json::from_str(
            r#"{
                "scope_items": [{ "code": "FI", "coefficient": 0.2 }],
                "integrations": 5,
                "profile": {
                    "name": "Core", "base_ft": 100.0, "basis": 20.0, "security_auth": 10.0
                }
            }"#,
        )
        .unwrap();
        assert_eq!(inputs.scope_items[0].tier, ScopeTier::A);
        assert_eq!(inputs.legal_entities, 1);
        assert!((inputs.capacity_per_month() - 20.0).abs() < 1e-9);
        assert!((Coefficients::of(&inputs).scope_breadth - 0.3).abs() < 1e-9);
    }
}
