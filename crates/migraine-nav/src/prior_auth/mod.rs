//! Prior-authorization approval estimator for migraine medications.
//!
//! An estimate starts from the historical approval rate for the drug under the
//! requested plan family, applies a fixed set of point deltas derived from the
//! patient's self-reported profile, and clamps the result to `[5, 95]`. The
//! reference table is bundled and never mutated at runtime.

pub mod domain;
mod recommendations;
pub mod router;
mod rules;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    DenialReasons, PaLookupError, PaRequestProfile, PaResult, PlanDrugStats, PlanType,
    PriorPaHistory, RequirementCheck, ScoreFactor, TypicalRequirements,
};
pub use router::prior_auth_router;

use recommendations::build_recommendations;
use rules::{requirement_checks, score_profile, total_score};
use tracing::debug;

/// Stateless estimator over the bundled plan/drug table.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorAuthEstimator;

impl PriorAuthEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(&self, profile: &PaRequestProfile) -> Result<PaResult, PaLookupError> {
        let drug = profile.drug_name.trim();
        let lookup = stats::resolve(drug, &profile.insurance_plan_type)
            .ok_or_else(|| PaLookupError::UnknownDrug(drug.to_string()))?;

        let (factors, signals) = score_profile(profile, lookup);
        let score = total_score(lookup.avg_approval_rate, &factors);
        let recommendations = build_recommendations(profile, lookup, &signals);
        let requirements_met = requirement_checks(profile, lookup);

        debug!(
            drug,
            requested_plan = %profile.insurance_plan_type,
            data_basis = lookup.plan_type,
            score,
            "prior authorization estimate computed"
        );

        Ok(PaResult {
            score,
            base_rate: lookup.avg_approval_rate,
            lookup: lookup.clone(),
            factors,
            recommendations,
            requirements_met,
            data_basis: lookup.plan_type,
        })
    }

    pub fn supported_drugs(&self) -> Vec<&'static str> {
        stats::drugs()
    }
}
